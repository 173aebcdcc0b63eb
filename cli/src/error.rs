//! Error types for the event search CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Search service not initialized")]
    NotInitialized,

    #[error("Invalid event in {path}: {message}")]
    InvalidEvent { path: PathBuf, message: String },

    #[error(transparent)]
    Search(#[from] event_search::SearchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
