//! Ingestion orchestration: one transaction and one progress line per
//! input file.

use super::discovery::discover_json_files;
use super::TransformError;
use crate::warehouse::WarehouseStore;
use anyhow::Result;
use std::path::Path;
use tracing::{error, info};

/// What one transform did with one file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReport {
    /// Records seen in the file, well-formed or not.
    pub records: usize,
    pub songs: usize,
    pub artists: usize,
    pub time_rows: usize,
    pub users: usize,
    pub songplays: usize,
    /// Records filtered out (non-song-play actions).
    pub skipped: usize,
    /// Malformed or rejected records.
    pub record_errors: usize,
}

/// Aggregated statistics for a run over one or more roots.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub records: usize,
    pub songs: usize,
    pub artists: usize,
    pub time_rows: usize,
    pub users: usize,
    pub songplays: usize,
    pub skipped: usize,
    pub record_errors: usize,
}

impl IngestStats {
    fn absorb(&mut self, report: &FileReport) {
        self.records += report.records;
        self.songs += report.songs;
        self.artists += report.artists;
        self.time_rows += report.time_rows;
        self.users += report.users;
        self.songplays += report.songplays;
        self.skipped += report.skipped;
        self.record_errors += report.record_errors;
    }

    pub fn merge(&mut self, other: &IngestStats) {
        self.files_found += other.files_found;
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.records += other.records;
        self.songs += other.songs;
        self.artists += other.artists;
        self.time_rows += other.time_rows;
        self.users += other.users;
        self.songplays += other.songplays;
        self.skipped += other.skipped;
        self.record_errors += other.record_errors;
    }
}

/// Discover every `.json` file under `root` and run `transform` over each,
/// committing after every file. One file is one commit unit; a transform
/// failure rolls its file back and the loop advances to the next one.
/// Transaction begin/commit failures are connection-level and propagate.
pub fn ingest<F>(store: &dyn WarehouseStore, root: &Path, transform: F) -> Result<IngestStats>
where
    F: Fn(&dyn WarehouseStore, &Path) -> Result<FileReport, TransformError>,
{
    let files = discover_json_files(root)?;
    info!("{} files found in {}", files.len(), root.display());

    let mut stats = IngestStats {
        files_found: files.len(),
        ..Default::default()
    };
    let total = files.len();
    for (index, file) in files.iter().enumerate() {
        store.begin()?;
        match transform(store, file) {
            Ok(report) => {
                store.commit()?;
                stats.absorb(&report);
                stats.files_processed += 1;
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                store.rollback()?;
                stats.files_failed += 1;
            }
        }
        info!("{}/{} files processed.", index + 1, total);
    }
    Ok(stats)
}
