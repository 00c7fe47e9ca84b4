use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlushyError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Worker error: {0}")]
    WorkerError(String),
}

impl PlushyError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlushyError::NotFound(_))
    }
}
