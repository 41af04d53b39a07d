//! Ingestion pipeline: file discovery, per-file transforms, and the
//! orchestrating runner.

mod discovery;
mod log_file;
mod runner;
mod song_file;

use std::path::PathBuf;
use thiserror::Error;

pub use discovery::discover_json_files;
pub use log_file::{process_log_file, LogEvent};
pub use runner::{ingest, FileReport, IngestStats};
pub use song_file::{process_song_file, SongRecord};

/// A failure that aborts one input file. Record-level problems inside a
/// file are logged and counted instead, and never reach the runner.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no record in {path}")]
    Empty { path: PathBuf },

    #[error("malformed song record in {path}: {source}")]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
