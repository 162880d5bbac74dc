//! In-memory dataset materialization.
//!
//! A [`DatasetSnapshot`] is one immutable build of the source table: the
//! ordered row records, a per-field index from normalized value to row
//! position, and build metadata. Indexes store positions into the snapshot's
//! own row vector, so an index can only ever refer to rows the snapshot
//! actually holds.

pub mod builder;

pub use builder::{build_snapshot, BuildError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One source row: canonical column name to trimmed value. Carries every
/// column discovered in the header, not just the required ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub fields: HashMap<String, String>,
}

impl RowRecord {
    /// Field value, or the empty string when the column is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }
}

/// Metadata recorded with every build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub rows: usize,
    pub source_id: String,
    pub table_name: String,
    /// RFC 3339 UTC timestamp of the build.
    pub built_at: String,
    pub ttl_secs: u64,
}

/// One fully-built materialization of the source table plus its indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    pub rows: Vec<RowRecord>,
    /// Indexed field name -> normalized value -> row position.
    pub indexes: HashMap<String, HashMap<String, usize>>,
    pub meta: SnapshotMeta,
}

impl DatasetSnapshot {
    /// Resolve an already-normalized key in the given field's index.
    pub fn lookup(&self, field: &str, normalized: &str) -> Option<&RowRecord> {
        self.indexes.get(field)?.get(normalized).and_then(|&position| self.rows.get(position))
    }
}
