//! Song metadata file transform: one JSON record per file, producing one
//! song row and one artist row.

use super::runner::FileReport;
use super::TransformError;
use crate::warehouse::{Artist, Song, WarehouseStore};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// One record of the song metadata dump. Fields the pipeline never uses
/// (num_songs, familiarity/hotness ranks) are left undeclared and ignored
/// by the deserializer.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub year: i32,
    pub duration: f64,
    pub artist_id: String,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    pub fn into_rows(self) -> (Song, Artist) {
        let song = Song {
            song_id: self.song_id,
            title: self.title,
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        };
        let artist = Artist {
            artist_id: self.artist_id,
            name: self.artist_name,
            location: self.artist_location,
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        };
        (song, artist)
    }
}

/// Parse one song file and submit its song and artist rows. The song goes
/// in first, matching the source dump's ordering; neither table enforces a
/// foreign key on the other.
pub fn process_song_file(
    store: &dyn WarehouseStore,
    path: &Path,
) -> Result<FileReport, TransformError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TransformError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // One record per file; the dump writes it on a single line.
    let line = raw
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| TransformError::Empty {
            path: path.to_path_buf(),
        })?;
    let record: SongRecord =
        serde_json::from_str(line).map_err(|source| TransformError::MalformedRecord {
            path: path.to_path_buf(),
            source,
        })?;

    let mut report = FileReport {
        records: 1,
        ..Default::default()
    };
    let (song, artist) = record.into_rows();

    match store.insert_song(&song) {
        Ok(()) => report.songs += 1,
        Err(e) => {
            warn!(
                "Could not insert song {} from {}: {}",
                song.song_id,
                path.display(),
                e
            );
            report.record_errors += 1;
        }
    }
    match store.insert_artist(&artist) {
        Ok(()) => report.artists += 1,
        Err(e) => {
            warn!(
                "Could not insert artist {} from {}: {}",
                artist.artist_id,
                path.display(),
                e
            );
            report.record_errors += 1;
        }
    }

    Ok(report)
}
