use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "coursetalk.toml";
const DEFAULT_DB_FILE: &str = "coursetalk.db";
const DEFAULT_LOG_FILTER: &str = "coursetalk=warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumConfig {
    pub data_dir: PathBuf,
    /// Database file name, relative to `data_dir`.
    pub db_file: String,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

/// On-disk overrides; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    db_file: Option<String>,
    log_filter: Option<String>,
}

impl ForumConfig {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Builds the config for `data_dir`, applying `coursetalk.toml` from
    /// that directory when present.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self::new(data_dir);
        let path = config.data_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            config.apply_file(&path)?;
        }
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        if let Some(db_file) = file.db_file {
            if db_file.trim().is_empty() {
                return Err(Error::Config("db_file cannot be empty".to_string()));
            }
            self.db_file = db_file;
        }
        if let Some(log_filter) = file.log_filter {
            self.log_filter = log_filter;
        }
        Ok(())
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            db_file: DEFAULT_DB_FILE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = ForumConfig::load(temp.path()).unwrap();

        assert_eq!(config.db_path(), temp.path().join("coursetalk.db"));
        assert_eq!(config.log_filter, "coursetalk=warn");
    }

    #[test]
    fn test_file_overrides() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "db_file = \"forum.sqlite\"\nlog_filter = \"coursetalk=debug\"\n",
        )
        .unwrap();

        let config = ForumConfig::load(temp.path()).unwrap();
        assert_eq!(config.db_path(), temp.path().join("forum.sqlite"));
        assert_eq!(config.log_filter, "coursetalk=debug");
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "port = 8080\n").unwrap();

        let result = ForumConfig::load(temp.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
