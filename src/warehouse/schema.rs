//! Warehouse schema: four dimensions and one fact table.
//!
//! Song and artist identifiers come from the source catalog and are text
//! primary keys. The fact table is keyed by rowid.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table};

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("duration", &SqlType::Real, non_null = true),
    ],
    indices: &[("idx_songs_title", "title")],
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[("idx_artists_name", "name")],
};

/// Epoch milliseconds decomposed into calendar parts. Keyed by the instant
/// itself so re-ingesting overlapping log files stays idempotent.
const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        sqlite_column!("start_time", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("hour", &SqlType::Integer, non_null = true),
        sqlite_column!("day", &SqlType::Integer, non_null = true),
        sqlite_column!("week", &SqlType::Integer, non_null = true),
        sqlite_column!("month", &SqlType::Integer, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("weekday", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text),
        sqlite_column!("level", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

/// The fact table. song_id/artist_id stay NULL when the lookup join finds
/// no match.
const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        sqlite_column!("songplay_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("start_time", &SqlType::Integer, non_null = true),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!("level", &SqlType::Text, non_null = true),
        sqlite_column!("song_id", &SqlType::Text),
        sqlite_column!("artist_id", &SqlType::Text),
        sqlite_column!("session_id", &SqlType::Integer, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[("idx_songplays_start_time", "start_time")],
};

/// Declaration order is creation order: dimensions first, the fact table
/// last. Drops run in reverse.
pub const WAREHOUSE_TABLES: &[Table] = &[
    SONGS_TABLE,
    ARTISTS_TABLE,
    TIME_TABLE,
    USERS_TABLE,
    SONGPLAYS_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_persistence;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_successfully() {
        let conn = Connection::open_in_memory().unwrap();
        sqlite_persistence::create_all(&conn, WAREHOUSE_TABLES).unwrap();
        sqlite_persistence::validate(&conn, WAREHOUSE_TABLES).unwrap();
    }

    #[test]
    fn test_insert_song_and_artist() {
        let conn = Connection::open_in_memory().unwrap();
        sqlite_persistence::create_all(&conn, WAREHOUSE_TABLES).unwrap();

        conn.execute(
            "INSERT INTO artists (artist_id, name, location, latitude, longitude)
             VALUES ('ARD7TVE1187B99BFB1', 'Casual', 'California - LA', NULL, NULL)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES ('SOMZWCG12A8C13C480', 'I Didn''t Mean To', 'ARD7TVE1187B99BFB1', 0, 218.93179)",
            [],
        )
        .unwrap();

        let (title, duration): (String, f64) = conn
            .query_row(
                "SELECT s.title, s.duration FROM songs s
                 JOIN artists a ON a.artist_id = s.artist_id
                 WHERE a.name = 'Casual'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(title, "I Didn't Mean To");
        assert!((duration - 218.93179).abs() < 1e-9);
    }

    #[test]
    fn test_songplay_references_are_nullable() {
        let conn = Connection::open_in_memory().unwrap();
        sqlite_persistence::create_all(&conn, WAREHOUSE_TABLES).unwrap();

        conn.execute(
            "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
             VALUES (1541990258796, 26, 'free', NULL, NULL, 583, 'San Jose-Sunnyvale-Santa Clara, CA', 'Mozilla/5.0')",
            [],
        )
        .unwrap();

        let (rowid, song_id): (i64, Option<String>) = conn
            .query_row(
                "SELECT songplay_id, song_id FROM songplays",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(rowid, 1);
        assert!(song_id.is_none());
    }

    #[test]
    fn test_duplicate_song_id_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        sqlite_persistence::create_all(&conn, WAREHOUSE_TABLES).unwrap();

        conn.execute(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES ('S1', 'T', 'AR1', 2000, 210.5)",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES ('S1', 'Other', 'AR2', 2001, 99.9)",
            [],
        );
        assert!(result.is_err());
    }
}
