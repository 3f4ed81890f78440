//! Error types for the transport adapter.

use crate::engine::ErrorCode;
use crate::state::Role;
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors surfaced by the adapter or forwarded from the protocol engine
#[derive(Error, Debug)]
pub enum TransportError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Errors reported by the protocol engine
    #[error("Engine error ({code}): {reason}")]
    Engine { code: ErrorCode, reason: String },

    /// An operation required an engine that is not currently active
    #[error("No active {role} engine")]
    NotActive { role: Role },
}

impl TransportError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        TransportError::Config {
            message: message.into(),
        }
    }

    /// Create an engine error
    pub fn engine(code: ErrorCode, reason: impl Into<String>) -> Self {
        TransportError::Engine {
            code,
            reason: reason.into(),
        }
    }

    /// Create an inactive-engine error for the given role
    pub fn not_active(role: Role) -> Self {
        TransportError::NotActive { role }
    }

    /// Check if this error was caused by using an inactive engine
    pub fn is_not_active(&self) -> bool {
        matches!(self, TransportError::NotActive { .. })
    }
}
