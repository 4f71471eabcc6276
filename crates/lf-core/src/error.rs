//! Errors raised at the engine's fallible boundaries.
//!
//! Interactive operations (drag, lock, group, undo) never fail; they degrade
//! to no-ops. Only configuration parsing and layout (de)serialization
//! surface errors.

use thiserror::Error;

/// Error type for configuration and persistence boundaries.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack encoding failed.
    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack decoding failed.
    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Configuration parsed but holds unusable values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The storage collaborator reported a failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Result alias for fallible layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
