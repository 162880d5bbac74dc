//! Snapshot builder: turns a raw source table into a [`DatasetSnapshot`].

use crate::config::LookupConfig;
use crate::dataset::{DatasetSnapshot, RowRecord, SnapshotMeta};
use crate::normalize::normalize_header;
use crate::source::{SourceError, TableSource};
use std::collections::HashMap;

/// Errors fatal to a build attempt. Surfaced to the administrative caller
/// that triggered the build; the request path can never hit these.
#[derive(Debug)]
pub enum BuildError {
    /// The source identifier is unset or the table could not be read.
    Source(SourceError),
    /// A required column is absent from the source header.
    MissingColumn(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Source(e) => write!(f, "Source error: {}", e),
            BuildError::MissingColumn(column) => write!(f, "Missing column: {}", column),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<SourceError> for BuildError {
    fn from(err: SourceError) -> Self {
        BuildError::Source(err)
    }
}

/// Build a snapshot from the configured table.
///
/// Rows carry all discovered columns with trimmed values; missing cells
/// coerce to the empty string. Index collisions under the same normalized
/// key resolve last-write-wins in source row order. A header-only table
/// yields an empty snapshot, not an error.
pub fn build_snapshot(
    source: &dyn TableSource,
    config: &LookupConfig,
) -> Result<DatasetSnapshot, BuildError> {
    if config.source_id.trim().is_empty() {
        return Err(BuildError::Source(SourceError::Unavailable(
            "source identifier is not set".to_string(),
        )));
    }

    let table = source.open_table(&config.table_name)?;

    let headers: Vec<String> = table.header.iter().map(|h| normalize_header(h)).collect();
    let header_positions: HashMap<&str, usize> =
        headers.iter().enumerate().map(|(i, h)| (h.as_str(), i)).collect();

    for column in &config.required_columns {
        if !header_positions.contains_key(column.as_str()) {
            return Err(BuildError::MissingColumn(column.clone()));
        }
    }

    let mut indexes: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for (field, _) in &config.indexed_fields {
        indexes.insert(field.clone(), HashMap::new());
    }

    let mut rows = Vec::with_capacity(table.rows.len());
    for cells in &table.rows {
        let mut fields = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            let value = cells.get(position).map(|c| c.trim()).unwrap_or("");
            fields.insert(header.clone(), value.to_string());
        }
        let record = RowRecord { fields };

        let row_position = rows.len();
        for (field, normalizer) in &config.indexed_fields {
            let raw = record.get(field);
            if raw.is_empty() {
                continue;
            }
            // Later rows overwrite earlier ones under the same key.
            if let Some(index) = indexes.get_mut(field) {
                index.insert(normalizer.apply(raw), row_position);
            }
        }

        rows.push(record);
    }

    let meta = SnapshotMeta {
        rows: rows.len(),
        source_id: config.source_id.clone(),
        table_name: config.table_name.clone(),
        built_at: chrono::Utc::now().to_rfc3339(),
        ttl_secs: config.cache_ttl_secs,
    };

    tracing::info!(
        rows = meta.rows,
        table = %meta.table_name,
        "Dataset snapshot built"
    );

    Ok(DatasetSnapshot { rows, indexes, meta })
}
