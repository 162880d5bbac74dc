//! The cache store contract.

use std::error::Error;
use std::fmt;

/// A process-external, time-expiring key -> blob store. The only shared
/// mutable state in the system.
///
/// Entries expire inside the store: an expired entry reads as absent, it is
/// never handed back to a caller. Writes replace the whole entry, so
/// concurrent writers resolve last-writer-wins at entry level without any
/// finer-grained locking.
pub trait CacheStore: Send + Sync {
    /// Read the live entry under `key`, or `None` when absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the entry under `key` with a lifetime of `ttl_secs` seconds.
    /// A TTL of zero expires the entry immediately.
    fn put(&self, key: &str, blob: &[u8], ttl_secs: u64) -> Result<(), StoreError>;

    /// Remove the entry under `key`. Idempotent.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Errors raised by a cache store.
#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Encode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Store I/O error: {}", msg),
            StoreError::Encode(msg) => write!(f, "Store encoding error: {}", msg),
        }
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Milliseconds since the Unix epoch; used by stores for expiry bookkeeping.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Absolute expiry instant for an entry written now. Saturates, so an
/// oversized TTL pins the expiry at u64::MAX instead of wrapping into the
/// past.
pub(crate) fn expiry_millis(ttl_secs: u64) -> u64 {
    now_millis().saturating_add(ttl_secs.saturating_mul(1000))
}
