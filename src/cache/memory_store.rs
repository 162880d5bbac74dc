//! In-memory cache store for tests and single-process deployments.

use crate::cache::store::{expiry_millis, now_millis, CacheStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

struct Entry {
    expires_at_millis: u64,
    payload: Vec<u8>,
}

/// Cache store holding entries in a process-local map, with the same
/// expiry semantics as the file store.
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if now_millis() < entry.expires_at_millis => {
                Ok(Some(entry.payload.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, blob: &[u8], ttl_secs: u64) -> Result<(), StoreError> {
        let entry =
            Entry { expires_at_millis: expiry_millis(ttl_secs), payload: blob.to_vec() };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
