//! Ingestion entry point: load song and event log files into the
//! warehouse.

use anyhow::Result;
use clap::Parser;
use playlog_etl::config::{CliConfig, EtlConfig, FileConfig};
use playlog_etl::ingestion::{ingest, process_log_file, process_song_file, IngestStats};
use playlog_etl::warehouse::{SqliteWarehouseStore, WarehouseStore};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "etl")]
#[command(about = "Load song metadata and event log files into the warehouse")]
struct CliArgs {
    /// Path to the SQLite warehouse database file.
    #[arg(long, default_value = "playlog.db")]
    db: PathBuf,

    /// Root directory of song metadata files.
    #[arg(long, default_value = "data/song_data")]
    song_data: PathBuf,

    /// Root directory of event log files.
    #[arg(long, default_value = "data/log_data")]
    log_data: PathBuf,

    /// Optional TOML config file; its values override CLI arguments.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let file_config = args.config.as_deref().map(FileConfig::load).transpose()?;
    let cli = CliConfig {
        db: args.db,
        song_data: args.song_data,
        log_data: args.log_data,
    };
    let config = EtlConfig::resolve(&cli, file_config)?;

    info!(
        "playlog-etl {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );
    info!("Warehouse: {}", config.db_path.display());

    let store = SqliteWarehouseStore::open(&config.db_path)?;

    let mut totals = IngestStats::default();

    info!("Processing song files...");
    let song_stats = ingest(&store, &config.song_data, process_song_file)?;
    totals.merge(&song_stats);

    info!("Processing log files...");
    let log_stats = ingest(&store, &config.log_data, process_log_file)?;
    totals.merge(&log_stats);

    info!("");
    info!("Ingestion Summary");
    info!("=================");
    info!(
        "Files processed: {}/{}",
        totals.files_processed, totals.files_found
    );
    info!("Songs loaded: {}", totals.songs);
    info!("Artists loaded: {}", totals.artists);
    info!("Time rows loaded: {}", totals.time_rows);
    info!("Users upserted: {}", totals.users);
    info!("Songplays loaded: {}", totals.songplays);
    info!("Records filtered: {}", totals.skipped);
    if totals.files_failed > 0 {
        warn!("Files failed: {}", totals.files_failed);
    }
    if totals.record_errors > 0 {
        warn!("Record errors: {}", totals.record_errors);
    }

    let counts = store.counts()?;
    info!("");
    info!("Warehouse contains:");
    info!("  {} songs", counts.songs);
    info!("  {} artists", counts.artists);
    info!("  {} time rows", counts.time_rows);
    info!("  {} users", counts.users);
    info!("  {} songplays", counts.songplays);

    Ok(())
}
