//! Error types for event-search

use thiserror::Error;

/// Errors that can occur while embedding, storing or searching events
#[derive(Debug, Error)]
pub enum SearchError {
    /// RocksDB error
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    /// Serialization error (bincode)
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UUID parsing error
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// The embedding model could not be loaded
    #[error("Model error: {0}")]
    Model(String),

    /// The embedding model could not encode a text
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Event not found
    #[error("Event not found: {0}")]
    NotFound(String),

    /// The event's text changed after its embedding was computed
    #[error("Event text changed during embedding: {0}")]
    TextChanged(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Store failure not originating from RocksDB
    #[error("Store error: {0}")]
    Store(String),

    /// Builder error
    #[error("Builder error: {0}")]
    Builder(#[from] crate::event::EventBuilderError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a text changed error
    pub fn text_changed(id: impl Into<String>) -> Self {
        Self::TextChanged(id.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Short category name, recorded in backfill reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Storage(_) | Self::Store(_) => "storage",
            Self::Bincode(_) | Self::Json(_) => "serialization",
            Self::Uuid(_) => "identifier",
            Self::Model(_) => "model_load",
            Self::Embedding(_) => "encoding",
            Self::NotFound(_) => "not_found",
            Self::TextChanged(_) => "text_changed",
            Self::InvalidPath(_) => "invalid_path",
            Self::Builder(_) => "builder",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}

/// Result type for event-search operations
pub type Result<T> = std::result::Result<T, SearchError>;
