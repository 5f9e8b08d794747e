use std::path::PathBuf;

use thiserror::Error;

// Every variant aborts the run. Missing tables and missing optional columns
// are handled in place with defaults and never surface here.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("SQLite file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    // The converter must never substitute an empty value for a missing
    // extracted-value column.
    #[error("table '{table}' row is missing required column '{column}'")]
    MissingField { table: String, column: String },

    #[error("SQLite storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
