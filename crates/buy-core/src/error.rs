//! # Buy Error Types
//!
//! Typed error handling for buy-rs.
//! All checkout and customer operations return `Result<T, BuyError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Clone, Error)]
pub enum BuyError {
    /// A required argument was missing or empty. Raised before any request is sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connectivity, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The storefront answered with a non-success status
    #[error("Rejected by storefront [{status}]: {message}")]
    Rejected { status: u16, message: String },

    /// The storefront answered with a body we could not decode
    #[error("Decode error: {0}")]
    Decode(String),

    /// Client configuration errors (missing keys, invalid domain)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The three failure channels a caller has to distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Transport,
    RemoteRejection,
}

impl BuyError {
    /// Classify this error.
    ///
    /// Configuration problems are reported as invalid arguments: they can
    /// only surface while building a client, never from the remote side.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuyError::InvalidArgument(_) | BuyError::Configuration(_) => ErrorKind::InvalidArgument,
            BuyError::Transport(_) => ErrorKind::Transport,
            BuyError::Rejected { .. } | BuyError::Decode(_) => ErrorKind::RemoteRejection,
        }
    }

    /// Remote HTTP status, if the storefront answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BuyError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the storefront does not know the checkout token
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BuyError::InvalidArgument(message.into())
    }
}

/// Result type alias for storefront operations
pub type BuyResult<T> = Result<T, BuyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BuyError::invalid_argument("empty token").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            BuyError::Transport("timeout".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            BuyError::Rejected {
                status: 422,
                message: "email is invalid".into()
            }
            .kind(),
            ErrorKind::RemoteRejection
        );
        assert_eq!(
            BuyError::Decode("missing field".into()).kind(),
            ErrorKind::RemoteRejection
        );
    }

    #[test]
    fn test_status_codes() {
        let not_found = BuyError::Rejected {
            status: 404,
            message: "Not Found".into(),
        };
        assert_eq!(not_found.status_code(), Some(404));
        assert!(not_found.is_not_found());
        assert_eq!(BuyError::Transport("reset".into()).status_code(), None);
    }

    #[test]
    fn test_display() {
        let err = BuyError::Rejected {
            status: 422,
            message: "reservation expired".into(),
        };
        assert_eq!(
            err.to_string(),
            "Rejected by storefront [422]: reservation expired"
        );
    }
}
