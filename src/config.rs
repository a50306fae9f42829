use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_SOURCE_PRIORITY;
use crate::error::{CatalogError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "sources.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_db_file")]
    pub db_file: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub summarize: SummarizeConfig,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceFile>,
}

/// One input file, resolved relative to `data_dir`
#[derive(Debug, Deserialize, Clone)]
pub struct SourceFile {
    pub filename: String,
    /// Snapshot date of the feed, recorded as "as of" on some sources
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizeConfig {
    #[serde(default = "default_priority")]
    pub source_priority: Vec<String>,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            source_priority: default_priority(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_db_file() -> PathBuf {
    PathBuf::from("serials.sqlite")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_priority() -> Vec<String> {
    DEFAULT_SOURCE_PRIORITY.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load from `path`, or from `SERIALS_CONFIG`, or from `sources.toml`.
    /// `SERIALS_DATA_DIR` and `SERIALS_DB` override the file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => env::var("SERIALS_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            CatalogError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml(&config_content)?;
        if let Ok(dir) = env::var("SERIALS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(db) = env::var("SERIALS_DB") {
            config.db_file = PathBuf::from(db);
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Configured entry for a source key
    pub fn source(&self, key: &str) -> Result<&SourceFile> {
        self.sources
            .get(key)
            .ok_or_else(|| CatalogError::Config(format!("No [sources.{}] entry in config", key)))
    }

    /// Full path of a configured input file. A configured file that does not
    /// exist on disk is fatal.
    pub fn source_path(&self, key: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(&self.source(key)?.filename);
        if !path.exists() {
            return Err(CatalogError::MissingInput { path });
        }
        Ok(path)
    }

    pub fn source_date(&self, key: &str) -> Option<NaiveDate> {
        self.sources.get(key).and_then(|s| s.date)
    }

    pub fn has_source(&self, key: &str) -> bool {
        self.sources.contains_key(key)
    }
}
