//! Connector error types.

use kitbridge_browser::BrowserError;
use kitbridge_http::{BoxError, HttpError};
use thiserror::Error;

/// Errors raised while sending a request across the bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// `send` was called before an application was configured.
    #[error("no application configured; call Connector::configure first")]
    NotConfigured,

    /// The response body stream could not be created.
    #[error("failed to allocate response body stream: {0}")]
    StreamAllocation(String),

    /// The native request could not be built (method, URI, header or cookie).
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A fluent request could not be built.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The application returned an error.
    #[error("application error: {0}")]
    Application(#[source] BoxError),
}

impl BridgeError {
    /// Returns the application's own error, if that is what failed.
    pub fn application_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Application(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_message() {
        assert!(BridgeError::NotConfigured
            .to_string()
            .contains("no application configured"));
    }

    #[test]
    fn test_http_error_is_transparent() {
        let err = BridgeError::from(HttpError::InvalidMethod("G E T".to_string()));
        assert_eq!(
            err.to_string(),
            HttpError::InvalidMethod("G E T".to_string()).to_string()
        );
    }

    #[test]
    fn test_application_error_kept() {
        let err = BridgeError::Application("database down".into());
        assert_eq!(err.to_string(), "application error: database down");
        assert_eq!(
            err.application_error().map(ToString::to_string),
            Some("database down".to_string())
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(BridgeError::NotConfigured.application_error().is_none());
    }
}
