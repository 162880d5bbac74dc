//! # Herbarium
//!
//! Herbarium is a cache-backed lookup service that answers Dialogflow ES
//! fulfillment requests against a small tabular herb dataset.
//!
//! The design splits the work into two paths that never block on each other:
//!
//! - **Write path**: an administratively triggered build reads the source
//!   table, materializes a [`dataset::DatasetSnapshot`] with precomputed
//!   per-field indexes, and stores it in an expiring cache entry.
//! - **Read path**: the webhook only ever consults the cache through
//!   [`cache::CacheManager::read_only`], which is contractually forbidden
//!   from touching the source of truth. A missing or expired entry is
//!   reported as a distinct cache-empty signal, never rebuilt inline.
//!
//! ## Example
//!
//! ```no_run
//! use herbarium::cache::{CacheManager, MemoryCacheStore};
//! use herbarium::config::LookupConfig;
//! use herbarium::lookup::LookupService;
//! use herbarium::source::CsvDirectorySource;
//! use std::sync::Arc;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LookupConfig { source_id: "./data".into(), ..LookupConfig::default() };
//!     config.validate()?;
//!
//!     let source = Arc::new(CsvDirectorySource::new("./data"));
//!     let store = Arc::new(MemoryCacheStore::new());
//!     let manager = Arc::new(CacheManager::new(store, source, config));
//!
//!     manager.get_or_build(true)?;
//!
//!     let lookup = LookupService::new(Arc::clone(&manager));
//!     let outcome = lookup.find("herb", "Ginger")?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

/// Cache store abstraction, file/memory stores, and the cache manager
pub mod cache;
/// Lookup configuration and its load-time validation
pub mod config;
/// Row records, dataset snapshots, and the snapshot builder
pub mod dataset;
/// Cache-only lookup service used by the request path
pub mod lookup;
/// Pure value and header normalizers
pub mod normalize;
/// Source-of-truth table accessors (CSV directory, HTTP CSV export)
pub mod source;
/// Dialogflow fulfillment envelope parsing and the axum webhook server
pub mod webhook;
