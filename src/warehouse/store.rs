//! SQLite-backed warehouse store.
//!
//! One connection, one writer. The ingestion runner brackets each input
//! file with `begin`/`commit` so a file is the unit of atomicity.

use super::models::{Artist, Song, SongPlay, TimeRow, User};
use super::schema::WAREHOUSE_TABLES;
use crate::sqlite_persistence::{self, SCHEMA_VERSION};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Row counts per table, for the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: i64,
    pub artists: i64,
    pub time_rows: i64,
    pub users: i64,
    pub songplays: i64,
}

/// Storage operations the ingestion pipeline needs.
pub trait WarehouseStore: Send + Sync {
    fn insert_song(&self, song: &Song) -> Result<()>;

    /// Insert-or-ignore: a second insert with the same identifier is a
    /// no-op, since many song files share an artist.
    fn insert_artist(&self, artist: &Artist) -> Result<()>;

    /// Insert-or-ignore keyed by the instant itself.
    fn insert_time_row(&self, row: &TimeRow) -> Result<()>;

    /// Insert, or overwrite `level` when the identifier already exists.
    fn upsert_user(&self, user: &User) -> Result<()>;

    fn insert_songplay(&self, play: &SongPlay) -> Result<()>;

    /// Resolve (song title, artist name, duration) to the stored
    /// (song_id, artist_id) pair by exact match. Ties resolve to the
    /// lowest song_id.
    fn find_song_and_artist(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<(String, String)>>;

    fn begin(&self) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;

    fn counts(&self) -> Result<TableCounts>;
}

#[derive(Debug)]
pub struct SqliteWarehouseStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWarehouseStore {
    /// Open an existing warehouse database, validating that its schema
    /// matches this build.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| {
            format!(
                "Failed to open warehouse database {} (run create-tables first?)",
                db_path.display()
            )
        })?;

        let version = sqlite_persistence::stored_version(&conn)?;
        if version != SCHEMA_VERSION {
            bail!(
                "Warehouse database {} has schema version {}, this build expects {}. \
                 Run create-tables to reset it.",
                db_path.display(),
                version,
                SCHEMA_VERSION
            );
        }
        sqlite_persistence::validate(&conn, WAREHOUSE_TABLES)
            .with_context(|| format!("Schema mismatch in {}", db_path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = SqliteWarehouseStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        let counts = store.counts()?;
        info!(
            "Opened warehouse: {} songs, {} artists, {} users, {} songplays",
            counts.songs, counts.artists, counts.users, counts.songplays
        );
        Ok(store)
    }

    /// Open or create the database file and reset its tables, leaving an
    /// empty schema at the current version.
    pub fn create<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to create warehouse database {}", db_path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = SqliteWarehouseStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.reset_tables()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteWarehouseStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.reset_tables()?;
        Ok(store)
    }

    /// Direct connection access (for testing).
    #[cfg(test)]
    pub fn raw_connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// Drop all five tables (facts before dimensions) and recreate them.
    /// Each statement is independent; running this on a fresh, partial, or
    /// fully populated database leaves the same empty schema.
    pub fn reset_tables(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        sqlite_persistence::drop_all(&conn, WAREHOUSE_TABLES)?;
        sqlite_persistence::create_all(&conn, WAREHOUSE_TABLES)?;
        Ok(())
    }
}

impl WarehouseStore for SqliteWarehouseStore {
    fn insert_song(&self, song: &Song) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                song.song_id,
                song.title,
                song.artist_id,
                song.year,
                song.duration
            ],
        )?;
        Ok(())
    }

    fn insert_artist(&self, artist: &Artist) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO artists (artist_id, name, location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude
            ],
        )?;
        Ok(())
    }

    fn insert_time_row(&self, row: &TimeRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO time (start_time, hour, day, week, month, year, weekday)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.start_time,
                row.hour,
                row.day,
                row.week,
                row.month,
                row.year,
                row.weekday
            ],
        )?;
        Ok(())
    }

    fn upsert_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (user_id, first_name, last_name, gender, level)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET level = ?5",
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.gender,
                user.level
            ],
        )?;
        Ok(())
    }

    fn insert_songplay(&self, play: &SongPlay) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                play.start_time,
                play.user_id,
                play.level,
                play.song_id,
                play.artist_id,
                play.session_id,
                play.location,
                play.user_agent
            ],
        )?;
        Ok(())
    }

    fn find_song_and_artist(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let result = conn
            .query_row(
                "SELECT s.song_id, s.artist_id FROM songs s
                 JOIN artists a ON a.artist_id = s.artist_id
                 WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
                 ORDER BY s.song_id
                 LIMIT 1",
                params![title, artist_name, duration],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        Ok(result)
    }

    fn begin(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("COMMIT", [])?;
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    fn counts(&self) -> Result<TableCounts> {
        let conn = self.conn.lock().unwrap();
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        };
        Ok(TableCounts {
            songs: count("songs")?,
            artists: count("artists")?,
            time_rows: count("time")?,
            users: count("users")?,
            songplays: count("songplays")?,
        })
    }
}
