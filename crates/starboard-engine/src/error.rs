//! Engine error types
//!
//! Every variant is contained within the handler of the event that raised it.

use starboard_core::PlatformError;
use thiserror::Error;

/// The post would carry no text, image, or links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("Nothing to post: message has no text, image, or media links")]
    NothingToPost,
}

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Feed channel, source message, or mirror not found (or already gone)
    #[error("{resource} not found: {id}")]
    Resolution { resource: &'static str, id: String },

    /// Network or platform call failure
    #[error("Platform call failed: {0}")]
    Transport(#[source] PlatformError),

    /// Nothing meaningful to post
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

impl EngineError {
    /// Create a resolution error
    pub fn resolution(resource: &'static str, id: impl ToString) -> Self {
        Self::Resolution {
            resource,
            id: id.to_string(),
        }
    }

    /// Get the error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "RESOLUTION",
            Self::Transport(_) => "TRANSPORT",
            Self::Composition(_) => "COMPOSITION",
        }
    }

    /// Check if this is a resolution error
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

impl From<PlatformError> for EngineError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound { resource, id } => Self::Resolution { resource, id },
            other => Self::Transport(other),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
