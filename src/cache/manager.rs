//! Cache manager: the orchestration point between the snapshot builder and
//! the cache store.
//!
//! The write path (`get_or_build`) may be arbitrarily slow; the read path
//! (`read_only`) is bounded by a single cache-store round trip and never
//! performs source I/O.

use crate::cache::store::CacheStore;
use crate::config::LookupConfig;
use crate::dataset::{build_snapshot, BuildError, DatasetSnapshot};
use crate::source::TableSource;
use std::sync::Arc;

/// Outcome of a cache-only read.
#[derive(Debug)]
pub enum CacheRead {
    /// A live, deserializable snapshot was found.
    Snapshot(DatasetSnapshot),
    /// No usable snapshot: absent, expired, or corrupt. Distinct from a
    /// value missing inside an existing snapshot.
    Empty,
}

/// Result of decoding the current cache entry. Corruption is kept as its
/// own branch here so the silent-recovery behavior is visible, then
/// collapsed to `Empty` at the public boundary.
enum Decoded {
    Snapshot(DatasetSnapshot),
    Missing,
    Corrupt,
}

/// Owns the injected cache store and table source and exposes the three
/// cache operations: get-or-build, read-only, invalidate.
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn TableSource>,
    config: LookupConfig,
}

impl CacheManager {
    pub fn new(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn TableSource>,
        config: LookupConfig,
    ) -> Self {
        Self { store, source, config }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Return the cached snapshot, building and caching a fresh one on any
    /// miss (absent, expired, or corrupt) or when `force_refresh` is set.
    ///
    /// Build failures surface to the caller; a failed cache write is logged
    /// but does not fail the build that produced the snapshot.
    pub fn get_or_build(&self, force_refresh: bool) -> Result<DatasetSnapshot, BuildError> {
        if !force_refresh {
            match self.decode_entry() {
                Decoded::Snapshot(snapshot) => return Ok(snapshot),
                Decoded::Missing | Decoded::Corrupt => {}
            }
        }

        let snapshot = build_snapshot(self.source.as_ref(), &self.config)?;

        match serde_json::to_vec(&snapshot) {
            Ok(blob) => {
                if let Err(e) =
                    self.store.put(&self.config.cache_key, &blob, self.config.cache_ttl_secs)
                {
                    tracing::warn!(error = %e, "Failed to write snapshot to the cache store");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize snapshot for caching");
            }
        }

        Ok(snapshot)
    }

    /// Read the cache store only; never builds, never touches the source.
    ///
    /// This is the only accessor the request path may use. A corrupt entry
    /// is removed so later reads do not re-parse it.
    pub fn read_only(&self) -> CacheRead {
        match self.decode_entry() {
            Decoded::Snapshot(snapshot) => CacheRead::Snapshot(snapshot),
            Decoded::Missing => CacheRead::Empty,
            Decoded::Corrupt => {
                tracing::warn!(
                    key = %self.config.cache_key,
                    "Corrupt cache entry found on the read path, removing it"
                );
                if let Err(e) = self.store.remove(&self.config.cache_key) {
                    tracing::warn!(error = %e, "Failed to remove corrupt cache entry");
                }
                CacheRead::Empty
            }
        }
    }

    /// Remove the cache entry unconditionally. Idempotent.
    pub fn invalidate(&self) -> Result<(), crate::cache::StoreError> {
        self.store.remove(&self.config.cache_key)
    }

    fn decode_entry(&self) -> Decoded {
        let blob = match self.store.get(&self.config.cache_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Decoded::Missing,
            Err(e) => {
                tracing::warn!(error = %e, "Cache store read failed, treating entry as absent");
                return Decoded::Missing;
            }
        };

        match serde_json::from_slice(&blob) {
            Ok(snapshot) => Decoded::Snapshot(snapshot),
            Err(e) => {
                tracing::debug!(error = %e, "Cache entry did not deserialize");
                Decoded::Corrupt
            }
        }
    }
}
