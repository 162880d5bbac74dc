//! Cache-only lookup service.
//!
//! The single entry point for the request path: normalizes a raw query
//! value, consults the cache through the read-only accessor, and classifies
//! the outcome. Never triggers a build.

use crate::cache::{CacheManager, CacheRead};
use crate::dataset::RowRecord;
use std::sync::Arc;

/// Outcome of a lookup against the cached snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The normalized query resolved to a row.
    Found(RowRecord),
    /// A snapshot exists but holds no row for the query.
    NotFound,
    /// No usable cached snapshot; the caller should retry after a build.
    CacheEmpty,
}

/// The requested field is not in the configured index set. A programmer or
/// configuration error, not a data miss; startup validation makes this
/// unreachable with a valid configuration.
#[derive(Debug)]
pub struct UnknownIndexField(pub String);

impl std::fmt::Display for UnknownIndexField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field '{}' is not a configured index field", self.0)
    }
}

impl std::error::Error for UnknownIndexField {}

/// Lookup service over the cache manager's read-only accessor.
pub struct LookupService {
    manager: Arc<CacheManager>,
}

impl LookupService {
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { manager }
    }

    /// Find the row for `raw_value` in `field`'s index.
    ///
    /// Fails closed: a blank value returns `NotFound` without touching the
    /// cache. A missing or corrupt cache entry is `CacheEmpty`, distinct
    /// from a miss inside an existing snapshot.
    pub fn find(&self, field: &str, raw_value: &str) -> Result<LookupOutcome, UnknownIndexField> {
        let normalizer = self
            .manager
            .config()
            .normalizer_for(field)
            .ok_or_else(|| UnknownIndexField(field.to_string()))?;

        if raw_value.trim().is_empty() {
            return Ok(LookupOutcome::NotFound);
        }

        let snapshot = match self.manager.read_only() {
            CacheRead::Snapshot(snapshot) => snapshot,
            CacheRead::Empty => return Ok(LookupOutcome::CacheEmpty),
        };

        let key = normalizer.apply(raw_value);
        match snapshot.lookup(field, &key) {
            Some(row) => {
                tracing::debug!(field, key = %key, "Lookup hit");
                Ok(LookupOutcome::Found(row.clone()))
            }
            None => {
                tracing::debug!(field, key = %key, "Lookup miss");
                Ok(LookupOutcome::NotFound)
            }
        }
    }
}
