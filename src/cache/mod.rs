//! The expiring snapshot cache: store abstraction, file and memory stores,
//! and the manager that orchestrates builds against reads.

pub mod file_store;
pub mod manager;
pub mod memory_store;
pub mod store;

pub use file_store::FileCacheStore;
pub use manager::{CacheManager, CacheRead};
pub use memory_store::MemoryCacheStore;
pub use store::{CacheStore, StoreError};
