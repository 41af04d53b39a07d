//! Database-level reset: destroy the warehouse file entirely.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Delete the warehouse database file and its WAL sidecars, if present.
/// Prior data is irrecoverably destroyed. The database is recreated by the
/// caller via [`super::SqliteWarehouseStore::create`].
pub fn reset_database(db_path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut target = db_path.as_os_str().to_os_string();
        target.push(suffix);
        let target = PathBuf::from(target);
        if target.exists() {
            std::fs::remove_file(&target)
                .with_context(|| format!("Failed to remove {}", target.display()))?;
            info!("Removed {}", target.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::{SqliteWarehouseStore, WarehouseStore};

    #[test]
    fn removes_database_and_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("warehouse.db");
        for suffix in ["", "-wal", "-shm"] {
            let mut name = db_path.as_os_str().to_os_string();
            name.push(suffix);
            std::fs::write(name, b"x").unwrap();
        }

        reset_database(&db_path).unwrap();
        assert!(!db_path.exists());
        assert!(!dir.path().join("warehouse.db-wal").exists());
        assert!(!dir.path().join("warehouse.db-shm").exists());
    }

    #[test]
    fn missing_database_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        reset_database(&dir.path().join("nothing.db")).unwrap();
    }

    #[test]
    fn reset_then_create_yields_empty_warehouse() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("warehouse.db");

        let store = SqliteWarehouseStore::create(&db_path).unwrap();
        drop(store);

        reset_database(&db_path).unwrap();
        let store = SqliteWarehouseStore::create(&db_path).unwrap();
        let counts = store.counts().unwrap();
        assert_eq!(counts.songs, 0);
        assert_eq!(counts.songplays, 0);
    }
}
