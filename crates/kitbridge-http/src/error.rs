//! Error types for building native requests and responses.

use thiserror::Error;

/// Boxed error returned by an [`Application`](crate::Application).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for request/response construction.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors raised while constructing native requests and responses.
#[derive(Error, Debug)]
pub enum HttpError {
    /// The method is not a valid HTTP token.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The URI could not be parsed or assembled.
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri {
        /// The offending URI text.
        uri: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A header name is not a valid HTTP token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value contains forbidden bytes.
    #[error("invalid value for header '{name}'")]
    InvalidHeaderValue {
        /// The header the value was meant for.
        name: String,
    },

    /// A body stream operation failed.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Create an invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid header value error.
    pub fn invalid_header_value(name: impl Into<String>) -> Self {
        Self::InvalidHeaderValue { name: name.into() }
    }
}
