//! Event log file transform: newline-delimited JSON events, filtered to
//! song plays and fanned out into time, user, and fact rows.

use super::runner::FileReport;
use super::TransformError;
use crate::warehouse::{SongPlay, TimeRow, User, WarehouseStore};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::warn;

/// Only records with this action produce rows. Everything else (login,
/// logout, page navigation) is discarded.
const NEXT_SONG_PAGE: &str = "NextSong";

/// One event from the application log. `userId` arrives as a number or a
/// numeric string, with the empty string standing in for "no user".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub page: String,
    pub ts: i64,
    #[serde(default, deserialize_with = "user_id_from_number_or_string")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub level: String,
    pub session_id: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
}

fn user_id_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid user id: {:?}", s))),
    }
}

impl LogEvent {
    fn user_row(&self) -> Option<User> {
        Some(User {
            user_id: self.user_id?,
            first_name: self.first_name.clone()?,
            last_name: self.last_name.clone()?,
            gender: self.gender.clone(),
            level: self.level.clone(),
        })
    }
}

/// Parse one log file and submit rows for every NextSong event: time and
/// user rows first, then the song-play facts they describe.
pub fn process_log_file(
    store: &dyn WarehouseStore,
    path: &Path,
) -> Result<FileReport, TransformError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TransformError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = FileReport::default();
    let mut plays: Vec<LogEvent> = Vec::new();

    for (line_index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.records += 1;
        let event: LogEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    "Malformed event at {}:{}: {}",
                    path.display(),
                    line_index + 1,
                    e
                );
                report.record_errors += 1;
                continue;
            }
        };
        if event.page != NEXT_SONG_PAGE {
            report.skipped += 1;
            continue;
        }
        if event.user_id.is_none() {
            warn!(
                "Song-play event without user id at {}:{}",
                path.display(),
                line_index + 1
            );
            report.record_errors += 1;
            continue;
        }
        plays.push(event);
    }

    // Time and user rows go in before any fact row is computed.
    for event in &plays {
        match TimeRow::from_epoch_ms(event.ts) {
            Some(row) => match store.insert_time_row(&row) {
                Ok(()) => report.time_rows += 1,
                Err(e) => {
                    warn!(
                        "Could not insert time row {} from {}: {}",
                        event.ts,
                        path.display(),
                        e
                    );
                    report.record_errors += 1;
                }
            },
            None => {
                warn!(
                    "Timestamp {} out of range in {}",
                    event.ts,
                    path.display()
                );
                report.record_errors += 1;
            }
        }
    }

    for event in &plays {
        match event.user_row() {
            Some(user) => match store.upsert_user(&user) {
                Ok(()) => report.users += 1,
                Err(e) => {
                    warn!(
                        "Could not upsert user {} from {}: {}",
                        user.user_id,
                        path.display(),
                        e
                    );
                    report.record_errors += 1;
                }
            },
            None => {
                warn!(
                    "Song-play event with incomplete user attributes in {}",
                    path.display()
                );
                report.record_errors += 1;
            }
        }
    }

    for event in &plays {
        let Some(user_id) = event.user_id else {
            continue;
        };

        let resolved = match (event.song.as_deref(), event.artist.as_deref(), event.length) {
            (Some(title), Some(artist_name), Some(length)) => {
                match store.find_song_and_artist(title, artist_name, length) {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("Song lookup failed in {}: {}", path.display(), e);
                        report.record_errors += 1;
                        None
                    }
                }
            }
            _ => None,
        };
        let (song_id, artist_id) = match resolved {
            Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
            None => (None, None),
        };

        let play = SongPlay {
            start_time: event.ts,
            user_id,
            level: event.level.clone(),
            song_id,
            artist_id,
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
        };
        match store.insert_songplay(&play) {
            Ok(()) => report.songplays += 1,
            Err(e) => {
                warn!(
                    "Could not insert songplay at {} from {}: {}",
                    event.ts,
                    path.display(),
                    e
                );
                report.record_errors += 1;
            }
        }
    }

    Ok(report)
}
