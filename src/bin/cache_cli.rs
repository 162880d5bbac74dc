//! Herb Cache CLI - Administrative tool for the snapshot cache.
//!
//! Usage:
//!   herb-cache rebuild --source-dir ./data
//!   herb-cache status --cache-dir ./data/cache
//!   herb-cache inspect herb ginger
//!   herb-cache clear

use clap::{Parser, Subcommand};
use herbarium::{
    cache::{CacheManager, CacheRead, FileCacheStore},
    config::LookupConfig,
    lookup::{LookupOutcome, LookupService},
    source::{CsvDirectorySource, HttpCsvSource, TableSource},
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "herb-cache")]
#[command(about = "Build, inspect, and clear the herb lookup cache")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory of CSV tables used when no spreadsheet id is given
    #[arg(long, default_value = "./data")]
    source_dir: String,

    /// Published spreadsheet id (falls back to HERBARIUM_SOURCE)
    #[arg(long)]
    sheet_id: Option<String>,

    /// Table (sheet) name inside the source
    #[arg(long, default_value = "data")]
    table: String,

    /// Directory holding the cache entry files
    #[arg(long, default_value = "./data/cache")]
    cache_dir: String,

    /// Cache entry lifetime in seconds
    #[arg(long, default_value = "21600")]
    ttl_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the cache from the source of truth
    Rebuild,
    /// Remove the cache entry
    Clear,
    /// Report whether a usable snapshot is cached
    Status,
    /// Look a value up in the cached snapshot (cache-only, never builds)
    Inspect { field: String, value: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let sheet_id = args.sheet_id.clone().or_else(|| std::env::var("HERBARIUM_SOURCE").ok());
    let source: Arc<dyn TableSource> = match &sheet_id {
        Some(id) if !id.trim().is_empty() => Arc::new(HttpCsvSource::new(id.clone())),
        _ => Arc::new(CsvDirectorySource::new(&args.source_dir)),
    };

    let config = LookupConfig {
        source_id: source.source_id(),
        table_name: args.table.clone(),
        cache_ttl_secs: args.ttl_secs,
        ..LookupConfig::default()
    };
    config.validate()?;

    let store = Arc::new(FileCacheStore::new(&args.cache_dir)?);
    let manager = Arc::new(CacheManager::new(store, source, config));

    match args.command {
        Command::Rebuild => {
            let snapshot = manager.get_or_build(true)?;
            println!("Cache rebuilt");
            println!("=============");
            println!("Rows:     {}", snapshot.meta.rows);
            println!("Source:   {}", snapshot.meta.source_id);
            println!("Table:    {}", snapshot.meta.table_name);
            println!("Built at: {}", snapshot.meta.built_at);
            println!("TTL:      {}s", snapshot.meta.ttl_secs);
        }
        Command::Clear => {
            manager.invalidate()?;
            println!("Cache entry removed");
        }
        Command::Status => match manager.read_only() {
            CacheRead::Snapshot(snapshot) => {
                println!("Cache is populated");
                println!("Rows:     {}", snapshot.meta.rows);
                println!("Source:   {}", snapshot.meta.source_id);
                println!("Built at: {}", snapshot.meta.built_at);
                println!("TTL:      {}s", snapshot.meta.ttl_secs);
            }
            CacheRead::Empty => {
                println!("Cache is empty (no build yet, expired, or unreadable)");
            }
        },
        Command::Inspect { field, value } => {
            let lookup = LookupService::new(Arc::clone(&manager));
            match lookup.find(&field, &value)? {
                LookupOutcome::Found(row) => {
                    println!("Found:");
                    let mut fields: Vec<_> = row.fields.iter().collect();
                    fields.sort();
                    for (name, field_value) in fields {
                        println!("  {:<12} {}", name, field_value);
                    }
                }
                LookupOutcome::NotFound => {
                    println!("No row found for '{}' in field '{}'", value, field);
                }
                LookupOutcome::CacheEmpty => {
                    println!("Cache is empty - run 'herb-cache rebuild' first");
                }
            }
        }
    }

    Ok(())
}
