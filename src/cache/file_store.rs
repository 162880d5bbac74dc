//! File-backed cache store: one file per key under a base directory.
//!
//! Each file holds a bincode envelope of `{ expires_at_millis, payload }`.
//! Writes go to a temp file and are renamed into place, so readers never
//! observe a partially written entry. Expired or undecodable files are
//! deleted lazily on read.

use crate::cache::store::{expiry_millis, now_millis, CacheStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    expires_at_millis: u64,
    payload: Vec<u8>,
}

/// Cache store persisting entries as files under a directory.
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Create the store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys are configuration-controlled identifiers, not user input;
        // non-filename characters are mapped to '_' all the same.
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.cache", file_name))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope = match bincode::deserialize(&bytes) {
            Ok(envelope) => envelope,
            Err(_) => {
                // An unreadable envelope is equivalent to an absent entry.
                let _ = fs::remove_file(&path);
                return Ok(None);
            }
        };

        if now_millis() >= envelope.expires_at_millis {
            let _ = fs::remove_file(&path);
            return Ok(None);
        }

        Ok(Some(envelope.payload))
    }

    fn put(&self, key: &str, blob: &[u8], ttl_secs: u64) -> Result<(), StoreError> {
        let envelope =
            Envelope { expires_at_millis: expiry_millis(ttl_secs), payload: blob.to_vec() };
        let encoded =
            bincode::serialize(&envelope).map_err(|e| StoreError::Encode(e.to_string()))?;

        // The temp name must be unique per write: a shared temp path lets
        // a concurrent writer reopen it after this one renames it into
        // place, mutating the installed entry in place.
        let path = self.entry_path(key);
        let tmp_path = path.with_extension(format!(
            "cache.tmp-{}-{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp_path, &encoded)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
