//! Common test infrastructure for end-to-end pipeline tests.
//!
//! Builds a throwaway data tree (song_data/, log_data/) and warehouse
//! database under a tempdir, plus builders for song and event records.

use std::path::PathBuf;
use tempfile::TempDir;

pub const SONG_ID: &str = "S1";
pub const SONG_TITLE: &str = "T";
pub const SONG_DURATION: f64 = 210.5;
pub const ARTIST_ID: &str = "AR1";
pub const ARTIST_NAME: &str = "X";

pub struct TestWarehouse {
    // Held for its Drop: the tempdir disappears with the fixture.
    _dir: TempDir,
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
}

impl TestWarehouse {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("warehouse.db");
        let song_data = dir.path().join("song_data");
        let log_data = dir.path().join("log_data");
        std::fs::create_dir_all(&song_data).unwrap();
        std::fs::create_dir_all(&log_data).unwrap();
        TestWarehouse {
            _dir: dir,
            db_path,
            song_data,
            log_data,
        }
    }

    pub fn write_song_file(&self, relative: &str, contents: &str) {
        let path = self.song_data.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn write_log_file(&self, relative: &str, lines: &[String]) {
        let path = self.log_data.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, lines.join("\n")).unwrap();
    }
}

/// One song metadata record in the dump format.
pub fn song_record(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
    year: i32,
) -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{artist_id}", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "{artist_name}", "song_id": "{song_id}", "title": "{title}", "duration": {duration}, "year": {year}}}"#
    )
}

/// One NextSong event line referencing a song by (title, artist, length).
pub fn next_song_event(
    ts: i64,
    user_id: i64,
    level: &str,
    song: &str,
    artist: &str,
    length: f64,
) -> String {
    format!(
        r#"{{"artist":"{artist}","auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":0,"lastName":"Smith","length":{length},"level":"{level}","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"PUT","page":"NextSong","registration":1541016707796.0,"sessionId":583,"song":"{song}","status":200,"ts":{ts},"userAgent":"Mozilla/5.0","userId":"{user_id}"}}"#
    )
}

/// One non-play event line (login, logout, page navigation).
pub fn page_event(page: &str, ts: i64, user_id: i64) -> String {
    format!(
        r#"{{"artist":null,"auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":0,"lastName":"Smith","length":null,"level":"free","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"GET","page":"{page}","registration":1541016707796.0,"sessionId":583,"song":null,"status":200,"ts":{ts},"userAgent":"Mozilla/5.0","userId":"{user_id}"}}"#
    )
}
