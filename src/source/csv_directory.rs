//! Table source backed by a directory of CSV files, one file per table.

use crate::source::{csv, SourceError, Table, TableSource};
use std::fs;
use std::path::PathBuf;

/// Resolves a table name to `<dir>/<table>.csv`.
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TableSource for CsvDirectorySource {
    fn open_table(&self, table: &str) -> Result<Table, SourceError> {
        if self.dir.as_os_str().is_empty() {
            return Err(SourceError::Unavailable("source directory is not set".to_string()));
        }

        let path = self.dir.join(format!("{}.csv", table));
        if !path.is_file() {
            return Err(SourceError::TableNotFound(format!(
                "no table '{}' under {}",
                table,
                self.dir.display()
            )));
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| SourceError::Read(format!("{}: {}", path.display(), e)))?;

        Ok(csv::parse_table(&text))
    }

    fn source_id(&self) -> String {
        self.dir.display().to_string()
    }
}
