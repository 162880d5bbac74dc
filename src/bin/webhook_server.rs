//! Webhook Server Binary for Herbarium
//!
//! Serves the Dialogflow fulfillment webhook and the administrative cache
//! endpoints. The cache is refreshed out-of-band: either through the admin
//! endpoints, the herb-cache CLI, or the optional in-process refresh timer.
//!
//! Usage:
//!   cargo run --bin webhook_server -- --host 0.0.0.0 --port 8080 --source-dir ./data
//!   cargo run --bin webhook_server -- --sheet-id <spreadsheet-id> --refresh-secs 3600

use clap::Parser;
use herbarium::{
    cache::{CacheManager, FileCacheStore},
    config::LookupConfig,
    source::{CsvDirectorySource, HttpCsvSource, TableSource},
    webhook::start_server,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "Herbarium Webhook Server")]
#[command(about = "Cache-backed herb lookup webhook for Dialogflow ES", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8080")]
    port: u16,

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

    /// Intent display-name prefix handled by the webhook
    #[arg(long, default_value = "herb")]
    intent_prefix: String,

    /// Rebuild the cache every N seconds (0 = disabled)
    #[arg(long, default_value = "0")]
    refresh_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║                 Herbarium Lookup Service                       ║");
    println!("║                 Fulfillment Webhook Server                     ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();

    let sheet_id = args.sheet_id.clone().or_else(|| std::env::var("HERBARIUM_SOURCE").ok());
    let source: Arc<dyn TableSource> = match &sheet_id {
        Some(id) if !id.trim().is_empty() => {
            println!("Source: published spreadsheet '{}'", id);
            Arc::new(HttpCsvSource::new(id.clone()))
        }
        _ => {
            println!("Source: CSV directory '{}'", args.source_dir);
            Arc::new(CsvDirectorySource::new(&args.source_dir))
        }
    };

    let config = LookupConfig {
        source_id: source.source_id(),
        table_name: args.table.clone(),
        cache_ttl_secs: args.ttl_secs,
        intent_prefix: args.intent_prefix.clone(),
        ..LookupConfig::default()
    };
    config.validate()?;
    println!("  - Table: {}", config.table_name);
    println!("  - Cache key: {} (TTL {}s)", config.cache_key, config.cache_ttl_secs);
    println!("  - Intent prefix: {}", config.intent_prefix);
    println!();

    println!("Initializing cache store at: {}", args.cache_dir);
    let store = Arc::new(FileCacheStore::new(&args.cache_dir)?);
    let manager = Arc::new(CacheManager::new(store, source, config));
    println!();

    if args.refresh_secs > 0 {
        println!("Scheduled refresh: every {}s", args.refresh_secs);
        let refresh_manager = Arc::clone(&manager);
        let period = Duration::from_secs(args.refresh_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately, warming the cache at startup.
            loop {
                interval.tick().await;
                let manager = Arc::clone(&refresh_manager);
                match tokio::task::spawn_blocking(move || manager.get_or_build(true)).await {
                    Ok(Ok(snapshot)) => {
                        tracing::info!(rows = snapshot.meta.rows, "Scheduled cache refresh complete");
                    }
                    Ok(Err(e)) => tracing::error!(error = %e, "Scheduled cache refresh failed"),
                    Err(e) => tracing::error!(error = %e, "Scheduled refresh task failed"),
                }
            }
        });
    } else {
        println!("Scheduled refresh: disabled (use the admin endpoints or the herb-cache CLI)");
    }
    println!();

    let addr = format!("{}:{}", args.host, args.port);
    println!("Starting HTTP server...");
    println!();

    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        println!();
        println!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        result = start_server(&addr, manager) => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {
            println!("Server shut down gracefully");
        }
    }

    Ok(())
}
