//! Error taxonomy for identity-service interactions.

use thiserror::Error;

/// Result type alias for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Classified failure of an identity-service call.
///
/// The `Display` form is what session state surfaces to the UI, so service
/// messages render verbatim while transport failures carry a short prefix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Network or connection failure before a response was produced.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The identity service answered with an error body.
    #[error("{message}")]
    Service {
        /// Human-readable message, service-supplied where available.
        message: String,
    },

    /// Malformed local input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl IdentityError {
    /// Create a new transport error.
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new service error.
    pub fn service<T: Into<String>>(message: T) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Service {
                message: format!("malformed response body: {error}"),
            }
        } else {
            Self::Transport(error.to_string())
        }
    }
}
