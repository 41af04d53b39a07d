//! Warehouse reset tool: drops and recreates the database and its five
//! tables. Everything previously stored is destroyed.

use anyhow::Result;
use clap::Parser;
use playlog_etl::config::{EtlConfig, FileConfig};
use playlog_etl::warehouse::{reset_database, SqliteWarehouseStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "create-tables")]
#[command(about = "Drop and recreate the warehouse database and its tables")]
struct CliArgs {
    /// Path to the SQLite warehouse database file.
    #[arg(long, default_value = "playlog.db")]
    db: PathBuf,

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
    let db_path = EtlConfig::resolve_db_path(&args.db, file_config.as_ref());

    info!(
        "playlog-etl {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );
    info!("Resetting warehouse at {}", db_path.display());

    reset_database(&db_path)?;
    let _store = SqliteWarehouseStore::create(&db_path)?;

    info!("Warehouse ready at {}", db_path.display());
    Ok(())
}
