//! Error types for the MCP crate.
//!
//! These cover infrastructure faults only (startup, transport, framing).
//! Per-call failures travel as content blocks, never as errors of this type.

use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
