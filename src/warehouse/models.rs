//! Row types for the warehouse tables.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

/// One song, keyed by its catalog identifier. Inserted once and never
/// updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

/// One artist. Several song files may carry the same artist, so insertion
/// is insert-or-ignore on the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A timestamp decomposed into calendar parts. All fields are derived from
/// `start_time` (epoch milliseconds, UTC) and never set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: i64,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: String,
}

impl TimeRow {
    /// Decompose an epoch-milliseconds timestamp. Returns `None` when the
    /// value is outside the representable datetime range.
    pub fn from_epoch_ms(start_time: i64) -> Option<Self> {
        let instant: DateTime<Utc> = Utc.timestamp_millis_opt(start_time).single()?;
        Some(TimeRow {
            start_time,
            hour: instant.hour(),
            day: instant.day(),
            week: instant.iso_week().week(),
            month: instant.month(),
            year: instant.year(),
            weekday: instant.format("%A").to_string(),
        })
    }
}

/// One application user. `level` tracks the most recent subscription level
/// seen in the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: String,
}

/// One song-play fact. Song and artist references are resolved by the
/// lookup join and stay `None` when nothing matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SongPlay {
    pub start_time: i64,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
