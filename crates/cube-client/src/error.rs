//! Error types for the cube client.

use cube_codec::CodecError;
use doc_store::StoreError;
use thiserror::Error;

/// Errors that can occur while storing or loading cubes.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to access file: {0}")]
    File(#[from] std::io::Error),

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Document has no '{0}' field")]
    MissingField(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
