//! # Seed Data Loader
//!
//! Fills an empty library database with the five sample books.
//!
//! ## Usage
//! ```bash
//! # Use the configured database (libgenius.toml / LIBGENIUS_DB_PATH)
//! cargo run -p libgenius-service --bin seed
//!
//! # Specify database path
//! cargo run -p libgenius-service --bin seed -- --db ./data/libgenius.db
//!
//! # Use an explicit config file
//! cargo run -p libgenius-service --bin seed -- --config ./libgenius.toml
//! ```
//!
//! The samples go through the regular bulk-import path, so they are
//! checked exactly like any other imported snapshot.

use std::env;
use std::path::PathBuf;

use libgenius_db::RecordStore;
use libgenius_service::{telemetry, LibraryConfig, LibraryService};
use tracing::info;

const SAMPLE_BOOKS: &str = include_str!("sample_books.json");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("LibGenius Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (overrides config)");
                println!("  -c, --config <PATH>   Config file path");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = LibraryConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }

    telemetry::init_tracing(&config.logging.filter);

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    println!("LibGenius Seed Data Loader");
    println!("==========================");
    println!("Database: {}", config.database.path.display());
    println!();

    let (service, db) = LibraryService::open(&config).await?;

    let existing = db.books().count().await?;
    if existing > 0 {
        println!("Database already has {} books", existing);
        println!("  Skipping seed to avoid replacing them.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let imported = service.import_snapshot(SAMPLE_BOOKS).await?;
    info!(count = imported, "Sample books imported");

    let summary = service.library_summary().await?;
    println!("Imported {} books", imported);
    println!(
        "  available: {}, borrowed: {}, overdue: {}",
        summary.available, summary.borrowed, summary.overdue
    );

    db.close().await;
    Ok(())
}
