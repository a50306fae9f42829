use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to read ISSN-L table {}: {source}", path.display())]
    IssnMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
