use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source file for '{table}' not found at {}", path.display())]
    MissingSource { table: String, path: PathBuf },

    #[error("Staging table '{0}' does not exist; run the load step first")]
    StagingMissing(String),

    #[error("Staging table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Table '{table}' is declared before its dependency '{dependency}'")]
    SchemaOrder { table: String, dependency: String },
}

pub type Result<T> = std::result::Result<T, LoaderError>;
