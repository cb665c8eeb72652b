//! Native response.

use crate::{HttpError, HttpResult, Stream};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use std::io::Write;

/// Response produced by an [`Application`](crate::Application).
///
/// Like [`ServerRequest`](crate::ServerRequest), updates consume the value
/// and return a new one. The body is an in-memory [`Stream`].
///
/// # Example
///
/// ```
/// use http::{HeaderMap, StatusCode};
/// use kitbridge_http::{ServerResponse, Stream};
///
/// let response = ServerResponse::new(StatusCode::OK, HeaderMap::new(), Stream::new())
///     .with_status(StatusCode::CREATED)
///     .write("created")
///     .unwrap();
///
/// assert_eq!(response.status_code(), 201);
/// assert_eq!(response.body().contents(), "created");
/// ```
#[derive(Debug, Clone)]
pub struct ServerResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Stream,
}

impl ServerResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Stream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header values joined with `", "`, empty when absent.
    #[must_use]
    pub fn header_line(&self, name: &str) -> String {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> &Stream {
        &self.body
    }

    /// Mutable response body.
    pub fn body_mut(&mut self) -> &mut Stream {
        &mut self.body
    }

    /// Splits the response into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Stream) {
        (self.status, self.headers, self.body)
    }

    /// Replaces the status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replaces a header.
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    pub fn with_header(mut self, name: &str, value: &str) -> HttpResult<Self> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a header value, keeping existing ones.
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    pub fn with_added_header(mut self, name: &str, value: &str) -> HttpResult<Self> {
        let (name, value) = header_pair(name, value)?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: Stream) -> Self {
        self.body = body;
        self
    }

    /// Appends data to the body.
    ///
    /// # Errors
    ///
    /// Fails if the body stream rejects the write.
    pub fn write(mut self, data: impl AsRef<[u8]>) -> HttpResult<Self> {
        self.body.write_all(data.as_ref())?;
        Ok(self)
    }

    /// Writes `value` as JSON into a fresh body and sets the content type.
    ///
    /// # Errors
    ///
    /// Fails if `value` cannot be serialized.
    pub fn with_json<T: serde::Serialize>(mut self, value: &T) -> HttpResult<Self> {
        let bytes = serde_json::to_vec(value).map_err(std::io::Error::from)?;
        self.body = Stream::from_bytes(bytes);
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }
}

fn header_pair(name: &str, value: &str) -> HttpResult<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| HttpError::InvalidHeaderName(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| HttpError::invalid_header_value(name))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skeleton() -> ServerResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=UTF-8"),
        );
        ServerResponse::new(StatusCode::OK, headers, Stream::new())
    }

    #[test]
    fn test_status_and_headers() {
        let response = skeleton()
            .with_status(StatusCode::NOT_FOUND)
            .with_header("X-Test", "1")
            .unwrap()
            .with_added_header("x-test", "2")
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.header_line("x-test"), "1, 2");
        assert_eq!(response.header_line("content-type"), "text/html; charset=UTF-8");
    }

    #[test]
    fn test_write_appends() {
        let response = skeleton().write("a").unwrap().write(b"b").unwrap();
        assert_eq!(response.body().contents(), "ab");
    }

    #[test]
    fn test_with_json() {
        let response = skeleton().write("stale").unwrap().with_json(&json!({"ok": true})).unwrap();
        assert_eq!(response.header_line("content-type"), "application/json");
        assert_eq!(response.body().contents(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_invalid_header_value() {
        let err = skeleton().with_header("x-test", "bad\nvalue").unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeaderValue { .. }));
    }

    #[test]
    fn test_into_parts() {
        let (status, headers, body) = skeleton().write("x").unwrap().into_parts();
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(header::CONTENT_TYPE));
        assert_eq!(body.contents(), "x");
    }
}
