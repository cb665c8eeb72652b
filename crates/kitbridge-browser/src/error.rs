//! Browser-side error types.

use thiserror::Error;

/// Errors raised while building browser requests or reading responses.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Request building failed.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding failed.
    #[error("form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_build_message() {
        let err = BrowserError::RequestBuild("empty method".to_string());
        assert_eq!(err.to_string(), "request build error: empty method");
    }

    #[test]
    fn test_json_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = BrowserError::from(json_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
