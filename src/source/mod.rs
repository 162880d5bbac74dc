//! Source-of-truth table accessors.
//!
//! The dataset builder only talks to the [`TableSource`] trait; the concrete
//! accessor (local CSV directory or published-sheet HTTP export) is injected
//! at startup. Both implementations return the same [`Table`] shape: the
//! first source row is the header, everything after it is data.

pub mod csv;
pub mod csv_directory;
pub mod http_csv;

pub use csv_directory::CsvDirectorySource;
pub use http_csv::HttpCsvSource;

use std::error::Error;
use std::fmt;

/// A raw tabular read: header row plus data rows, untrimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Accessor for the authoritative tabular store.
///
/// Implementations may be arbitrarily slow or rate-limited; they are only
/// ever called from the build path, never from the request path.
pub trait TableSource: Send + Sync {
    /// Open the named table and return its header and data rows.
    fn open_table(&self, table: &str) -> Result<Table, SourceError>;

    /// Identifier used in snapshot metadata (directory path, spreadsheet id).
    fn source_id(&self) -> String;
}

/// Errors raised by a table source.
#[derive(Debug)]
pub enum SourceError {
    /// The source identifier is unset or the source itself is unreachable.
    Unavailable(String),
    /// The source exists but the requested table does not.
    TableNotFound(String),
    /// The table was located but could not be read.
    Read(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "Source unavailable: {}", msg),
            SourceError::TableNotFound(msg) => write!(f, "Table not found: {}", msg),
            SourceError::Read(msg) => write!(f, "Read error: {}", msg),
        }
    }
}

impl Error for SourceError {}
