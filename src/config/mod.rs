mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
}

impl EtlConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db.clone());
        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());

        if !song_data.is_dir() {
            bail!("Song data directory does not exist: {:?}", song_data);
        }
        if !log_data.is_dir() {
            bail!("Log data directory does not exist: {:?}", log_data);
        }

        Ok(EtlConfig {
            db_path,
            song_data,
            log_data,
        })
    }

    /// Resolve just the warehouse path, for tools that never touch the
    /// input data directories.
    pub fn resolve_db_path(cli_db: &Path, file_config: Option<&FileConfig>) -> PathBuf {
        file_config
            .and_then(|f| f.db.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| cli_db.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_for(dir: &Path) -> CliConfig {
        CliConfig {
            db: dir.join("warehouse.db"),
            song_data: dir.join("song_data"),
            log_data: dir.join("log_data"),
        }
    }

    #[test]
    fn resolves_from_cli_when_no_file_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("song_data")).unwrap();
        std::fs::create_dir(dir.path().join("log_data")).unwrap();

        let config = EtlConfig::resolve(&cli_for(dir.path()), None).unwrap();
        assert_eq!(config.db_path, dir.path().join("warehouse.db"));
        assert_eq!(config.song_data, dir.path().join("song_data"));
    }

    #[test]
    fn file_config_overrides_cli() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("song_data")).unwrap();
        std::fs::create_dir(dir.path().join("log_data")).unwrap();
        std::fs::create_dir(dir.path().join("other_songs")).unwrap();

        let toml_path = dir.path().join("etl.toml");
        std::fs::write(
            &toml_path,
            format!(
                "song_data = {:?}\n",
                dir.path().join("other_songs").to_string_lossy()
            ),
        )
        .unwrap();

        let file = FileConfig::load(&toml_path).unwrap();
        let config = EtlConfig::resolve(&cli_for(dir.path()), Some(file)).unwrap();
        assert_eq!(config.song_data, dir.path().join("other_songs"));
        assert_eq!(config.log_data, dir.path().join("log_data"));
    }

    #[test]
    fn missing_data_directory_bails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("song_data")).unwrap();
        // log_data is absent.
        let result = EtlConfig::resolve(&cli_for(dir.path()), None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Log data directory"));
    }

    #[test]
    fn resolve_db_path_prefers_file_config() {
        let cli_db = PathBuf::from("cli.db");
        assert_eq!(EtlConfig::resolve_db_path(&cli_db, None), cli_db);

        let file = FileConfig {
            db: Some("file.db".to_string()),
            ..Default::default()
        };
        assert_eq!(
            EtlConfig::resolve_db_path(&cli_db, Some(&file)),
            PathBuf::from("file.db")
        );
    }
}
