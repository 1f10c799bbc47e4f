//! Error types for doctrack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    /// Bad user input (empty title, no file selected). Nothing was changed.
    #[error("{0}")]
    Validation(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl DocError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DocError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DocError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DocError>;
