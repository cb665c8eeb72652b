//! Browser response wrapper.

use crate::error::BrowserError;
use http::StatusCode;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::fmt;

/// A framework-neutral HTTP response with helper methods for assertions.
#[derive(Clone, PartialEq, Eq)]
pub struct BrowserResponse {
    /// Body content
    content: String,
    /// HTTP status code
    status: u16,
    /// Response headers, each with all of its values
    headers: IndexMap<String, Vec<String>>,
}

impl BrowserResponse {
    /// Creates a response from its parts.
    pub fn new(
        content: impl Into<String>,
        status: u16,
        headers: IndexMap<String, Vec<String>>,
    ) -> Self {
        Self {
            content: content.into(),
            status,
            headers,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the status code as a typed value, if it is in range.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the status is a redirect (3xx).
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Returns true if the status is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns true if the status is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &IndexMap<String, Vec<String>> {
        &self.headers
    }

    /// Gets every value of a header, matching the name case-insensitively.
    #[must_use]
    pub fn header_values(&self, name: impl AsRef<str>) -> &[String] {
        let name = name.as_ref();
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map_or(&[], |(_, v)| v.as_slice())
    }

    /// Gets the first value of a header.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the Content-Length header value.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// Returns the body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consumes the response and returns the body.
    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }

    /// Deserializes the body as JSON.
    ///
    /// # Example
    ///
    /// ```
    /// use indexmap::IndexMap;
    /// use kitbridge_browser::BrowserResponse;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User {
    ///     id: String,
    /// }
    ///
    /// let response = BrowserResponse::new(r#"{"id":"123"}"#, 200, IndexMap::new());
    /// let user: User = response.json().unwrap();
    /// assert_eq!(user.id, "123");
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BrowserError> {
        serde_json::from_str(&self.content).map_err(BrowserError::Json)
    }

    /// Deserializes the body as a JSON Value.
    pub fn json_value(&self) -> Result<serde_json::Value, BrowserError> {
        self.json()
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}",
            expected, self.status
        );
        self
    }

    /// Asserts that the response is successful (2xx).
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.is_success(),
            "Expected success status, got {}",
            self.status
        );
        self
    }

    /// Asserts that a header exists with the expected first value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(
            actual, expected,
            "Header '{}': expected '{}', got '{}'",
            name, expected, actual
        );
        self
    }

    /// Asserts that the Content-Type header starts with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if Content-Type is missing or doesn't match.
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self
            .content_type()
            .unwrap_or_else(|| panic!("Content-Type header not found"));
        assert!(
            actual.starts_with(expected),
            "Content-Type: expected '{}', got '{}'",
            expected,
            actual
        );
        self
    }

    /// Asserts that the body contains the expected substring.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        assert!(
            self.content.contains(expected),
            "Body should contain '{}', got: {}",
            expected,
            self.content
        );
        self
    }

    /// Asserts that the body equals the expected string.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't match.
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        assert_eq!(self.content, expected.as_ref(), "Body mismatch");
        self
    }

    /// Asserts that the JSON body matches the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or doesn't match.
    pub fn assert_json_eq(&self, expected: &serde_json::Value) -> &Self {
        let actual = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body should be valid JSON: {e}"));
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts that a JSON field exists and equals the expected value.
    ///
    /// Paths are dot-separated; numeric segments index arrays
    /// (`items.0.name`).
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    pub fn assert_json_field(
        &self,
        path: impl AsRef<str>,
        expected: &serde_json::Value,
    ) -> &Self {
        let path = path.as_ref();
        let json = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body should be valid JSON: {e}"));
        let actual = json_path(&json, path).unwrap_or_else(|| {
            panic!("JSON path '{}' not found in: {:?}", path, json);
        });
        assert_eq!(
            actual, expected,
            "JSON field '{}': expected {:?}, got {:?}",
            path, expected, actual
        );
        self
    }
}

impl fmt::Debug for BrowserResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Simple JSON path accessor.
fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        if let Ok(index) = segment.parse::<usize>() {
            current = current.get(index)?;
        } else {
            current = current.get(segment)?;
        }
    }
    Some(current)
}
