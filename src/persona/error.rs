//! Error taxonomy for persona storage

use thiserror::Error;

/// Failure of the durable key-value layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O error on storage key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Value does not fit in the configured quota
    #[error("Storage quota exceeded for key '{key}': {size} bytes (limit {quota})")]
    QuotaExceeded { key: String, size: usize, quota: usize },

    /// Value could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors returned by persona mutations
///
/// Reads never produce these: a broken store degrades to built-ins only.
#[derive(Error, Debug)]
pub enum PersonaError {
    /// A required field was blank after trimming
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No custom persona has this id
    #[error("Custom persona not found: {0}")]
    NotFound(String),

    /// The durable store rejected the write
    #[error("Failed to persist personas: {0}")]
    Storage(#[from] StorageError),
}
