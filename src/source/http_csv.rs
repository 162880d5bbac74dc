//! Table source that fetches a published spreadsheet's CSV export over HTTP.
//!
//! Uses the blocking reqwest client: the build path is synchronous and runs
//! off the async executor (the server pushes builds through
//! `spawn_blocking`, the CLI has no runtime at all).

use crate::source::{csv, SourceError, Table, TableSource};

/// Fetches `https://docs.google.com/spreadsheets/d/<id>/gviz/tq` CSV exports
/// for a published spreadsheet.
pub struct HttpCsvSource {
    spreadsheet_id: String,
}

impl HttpCsvSource {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self { spreadsheet_id: spreadsheet_id.into() }
    }

    fn export_url(&self, table: &str) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}",
            self.spreadsheet_id, table
        )
    }
}

impl TableSource for HttpCsvSource {
    fn open_table(&self, table: &str) -> Result<Table, SourceError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(SourceError::Unavailable("spreadsheet id is not set".to_string()));
        }

        let url = self.export_url(table);
        let response = reqwest::blocking::get(&url)
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::TableNotFound(format!(
                "table '{}' in spreadsheet '{}' (HTTP {})",
                table,
                self.spreadsheet_id,
                response.status()
            )));
        }

        let text = response.text().map_err(|e| SourceError::Read(e.to_string()))?;
        Ok(csv::parse_table(&text))
    }

    fn source_id(&self) -> String {
        self.spreadsheet_id.clone()
    }
}
