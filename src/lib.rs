//! Playlog ETL Library
//!
//! Batch pipeline staging song-play analytics: song metadata and
//! application event logs come in as JSON files, and a SQLite star schema
//! (songs, artists, users, time, songplays) comes out.

pub mod config;
pub mod ingestion;
pub mod sqlite_persistence;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use ingestion::{ingest, process_log_file, process_song_file, IngestStats};
pub use warehouse::{reset_database, SqliteWarehouseStore, WarehouseStore};
