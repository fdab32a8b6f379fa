//! Platform errors - failures reported by the chat platform boundary

use thiserror::Error;

/// Errors raised by a [`ChatPlatform`](crate::traits::ChatPlatform) implementation
#[derive(Debug, Error)]
pub enum PlatformError {
    // =========================================================================
    // Resolution Errors
    // =========================================================================
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Transport(_) => "TRANSPORT",
            Self::Rejected { .. } => "REJECTED",
            Self::Decode(_) => "DECODE",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
