//! Browser request building.

use crate::error::BrowserError;
use bytes::Bytes;
use indexmap::IndexMap;
use kitbridge_http::{FileFields, UploadedFile};
use serde::Serialize;

/// An upload attached to a browser request.
#[derive(Debug, Clone, PartialEq)]
pub enum FileEntry {
    /// A file already in the native upload representation.
    Upload(UploadedFile),
    /// Raw upload metadata keyed like `$_FILES` entries
    /// (`tmp_name`, `name`, `type`, `size`, `error`).
    Fields(FileFields),
}

impl From<UploadedFile> for FileEntry {
    fn from(file: UploadedFile) -> Self {
        Self::Upload(file)
    }
}

impl From<FileFields> for FileEntry {
    fn from(fields: FileFields) -> Self {
        Self::Fields(fields)
    }
}

/// A framework-neutral HTTP request issued by a simulated browser.
///
/// Headers are kept apart from server variables;
/// [`BrowserRequest::server_variables`] merges them the way a CGI gateway
/// would.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserRequest {
    method: String,
    uri: String,
    server: IndexMap<String, String>,
    headers: IndexMap<String, Vec<String>>,
    cookies: IndexMap<String, String>,
    content: Option<Bytes>,
    parameters: IndexMap<String, String>,
    files: IndexMap<String, FileEntry>,
}

impl BrowserRequest {
    /// Creates a request builder.
    pub fn builder(method: impl AsRef<str>, uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new(method, uri)
    }

    /// Creates a GET request builder.
    pub fn get(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("GET", uri)
    }

    /// Creates a POST request builder.
    pub fn post(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("POST", uri)
    }

    /// Creates a PUT request builder.
    pub fn put(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("PUT", uri)
    }

    /// Creates a PATCH request builder.
    pub fn patch(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("PATCH", uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("DELETE", uri)
    }

    /// Creates an OPTIONS request builder.
    pub fn options(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("OPTIONS", uri)
    }

    /// Creates a HEAD request builder.
    pub fn head(uri: impl AsRef<str>) -> BrowserRequestBuilder {
        BrowserRequestBuilder::new("HEAD", uri)
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request URI as given.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Server variables as given.
    #[must_use]
    pub fn server(&self) -> &IndexMap<String, String> {
        &self.server
    }

    /// Explicit headers.
    #[must_use]
    pub fn headers(&self) -> &IndexMap<String, Vec<String>> {
        &self.headers
    }

    /// Cookies known to the browser.
    #[must_use]
    pub fn cookies(&self) -> &IndexMap<String, String> {
        &self.cookies
    }

    /// Raw body content.
    #[must_use]
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Form parameters.
    #[must_use]
    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.parameters
    }

    /// Uploads by field name.
    #[must_use]
    pub fn files(&self) -> &IndexMap<String, FileEntry> {
        &self.files
    }

    /// Server variables with explicit headers folded in as CGI keys.
    ///
    /// `Content-Type` and `Content-Length` map to `CONTENT_TYPE` and
    /// `CONTENT_LENGTH`, every other header to `HTTP_<NAME>`. Multiple values
    /// are joined with `", "`, except `Cookie` values, which are joined with
    /// `"; "`. A server variable wins over a header that maps to the same key.
    ///
    /// # Example
    ///
    /// ```
    /// use kitbridge_browser::BrowserRequest;
    ///
    /// let request = BrowserRequest::get("/")
    ///     .header("X-Request-Id", "42")
    ///     .content_type("text/plain")
    ///     .build()
    ///     .unwrap();
    ///
    /// let server = request.server_variables();
    /// assert_eq!(server.get("HTTP_X_REQUEST_ID").map(String::as_str), Some("42"));
    /// assert_eq!(server.get("CONTENT_TYPE").map(String::as_str), Some("text/plain"));
    /// ```
    #[must_use]
    pub fn server_variables(&self) -> IndexMap<String, String> {
        let mut vars = self.server.clone();
        for (name, values) in &self.headers {
            let separator = if name.eq_ignore_ascii_case("cookie") {
                "; "
            } else {
                ", "
            };
            vars.entry(cgi_key(name))
                .or_insert_with(|| values.join(separator));
        }
        vars
    }
}

/// CGI variable name for a header.
fn cgi_key(header: &str) -> String {
    let key = header.trim().to_ascii_uppercase().replace('-', "_");
    match key.as_str() {
        "CONTENT_TYPE" | "CONTENT_LENGTH" => key,
        _ => format!("HTTP_{key}"),
    }
}

/// Builder for [`BrowserRequest`].
#[must_use]
pub struct BrowserRequestBuilder {
    method: String,
    uri: String,
    server: IndexMap<String, String>,
    headers: IndexMap<String, Vec<String>>,
    cookies: IndexMap<String, String>,
    content: Option<Bytes>,
    parameters: IndexMap<String, String>,
    files: IndexMap<String, FileEntry>,
    error: Option<BrowserError>,
}

impl BrowserRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        Self {
            method: method.as_ref().to_string(),
            uri: uri.as_ref().to_string(),
            server: IndexMap::new(),
            headers: IndexMap::new(),
            cookies: IndexMap::new(),
            content: None,
            parameters: IndexMap::new(),
            files: IndexMap::new(),
            error: None,
        }
    }

    /// Adds a header value. Repeated names collect several values.
    ///
    /// # Example
    ///
    /// ```
    /// use kitbridge_browser::BrowserRequest;
    ///
    /// let request = BrowserRequest::get("/users")
    ///     .header("Authorization", "Bearer token")
    ///     .header("X-Request-ID", "12345")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.headers().len(), 2);
    /// ```
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let existing = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.to_string());
        self.headers
            .entry(existing)
            .or_default()
            .push(value.as_ref().to_string());
        self
    }

    /// Sets a server variable.
    pub fn server(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(key.into(), value.into());
        self
    }

    /// Records a cookie known to the browser.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Sets a form parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Sets several form parameters.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attaches an upload to a field.
    pub fn file(mut self, field: impl Into<String>, entry: impl Into<FileEntry>) -> Self {
        self.files.insert(field.into(), entry.into());
        self
    }

    /// Sets the raw request body.
    pub fn content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.replace_header("Content-Type", content_type)
    }

    /// Sets the Accept header.
    pub fn accept(self, accept: impl AsRef<str>) -> Self {
        self.replace_header("Accept", accept)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.replace_header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Sets the request body as JSON and the content type to
    /// `application/json`.
    ///
    /// Serialization errors surface from [`build`](Self::build).
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.content = Some(Bytes::from(bytes)),
            Err(e) => self.error = Some(BrowserError::Json(e)),
        }
        self.content_type("application/json")
    }

    /// Sets the request body as URL-encoded form data and the content type
    /// to `application/x-www-form-urlencoded`.
    ///
    /// Encoding errors surface from [`build`](Self::build).
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) => self.content = Some(Bytes::from(encoded)),
            Err(e) => self.error = Some(BrowserError::Form(e)),
        }
        self.content_type("application/x-www-form-urlencoded")
    }

    fn replace_header(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers
            .insert(name.to_string(), vec![value.as_ref().to_string()]);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Fails on an empty method, or when a JSON or form body could not be
    /// encoded.
    pub fn build(self) -> Result<BrowserRequest, BrowserError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.method.trim().is_empty() {
            return Err(BrowserError::RequestBuild("empty HTTP method".to_string()));
        }

        Ok(BrowserRequest {
            method: self.method,
            uri: self.uri,
            server: self.server,
            headers: self.headers,
            cookies: self.cookies,
            content: self.content,
            parameters: self.parameters,
            files: self.files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request() {
        let request = BrowserRequest::get("/users").build().unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.uri(), "/users");
        assert!(request.content().is_none());
    }

    #[test]
    fn test_method_shortcuts() {
        assert_eq!(BrowserRequest::post("/").build().unwrap().method(), "POST");
        assert_eq!(BrowserRequest::put("/").build().unwrap().method(), "PUT");
        assert_eq!(BrowserRequest::patch("/").build().unwrap().method(), "PATCH");
        assert_eq!(BrowserRequest::delete("/").build().unwrap().method(), "DELETE");
        assert_eq!(BrowserRequest::options("/").build().unwrap().method(), "OPTIONS");
        assert_eq!(BrowserRequest::head("/").build().unwrap().method(), "HEAD");
    }

    #[test]
    fn test_empty_method_rejected() {
        let err = BrowserRequest::builder(" ", "/").build().unwrap_err();
        assert!(matches!(err, BrowserError::RequestBuild(_)));
    }

    #[test]
    fn test_header_collects_values() {
        let request = BrowserRequest::get("/")
            .header("Accept", "text/html")
            .header("accept", "application/json")
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("Accept"),
            Some(&vec!["text/html".to_string(), "application/json".to_string()])
        );
        assert_eq!(
            request.server_variables().get("HTTP_ACCEPT").map(String::as_str),
            Some("text/html, application/json")
        );
    }

    #[test]
    fn test_bearer_token_replaces() {
        let request = BrowserRequest::get("/")
            .header("authorization", "Basic abc")
            .bearer_token("my_token")
            .build()
            .unwrap();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(
            request.server_variables().get("HTTP_AUTHORIZATION").map(String::as_str),
            Some("Bearer my_token")
        );
    }

    #[test]
    fn test_cookie_values_joined_with_semicolons() {
        let request = BrowserRequest::get("/")
            .header("Cookie", "a=1")
            .header("Cookie", "b=2")
            .header("Accept", "text/html")
            .header("Accept", "application/json")
            .build()
            .unwrap();

        let server = request.server_variables();
        assert_eq!(server.get("HTTP_COOKIE").map(String::as_str), Some("a=1; b=2"));
        assert_eq!(
            server.get("HTTP_ACCEPT").map(String::as_str),
            Some("text/html, application/json")
        );
    }

    #[test]
    fn test_server_variable_wins_over_header() {
        let request = BrowserRequest::get("/")
            .server("HTTP_HOST", "server.example")
            .header("Host", "header.example")
            .build()
            .unwrap();

        assert_eq!(
            request.server_variables().get("HTTP_HOST").map(String::as_str),
            Some("server.example")
        );
    }

    #[test]
    fn test_json_body() {
        let request = BrowserRequest::post("/users")
            .json(&json!({"name": "Alice"}))
            .build()
            .unwrap();

        assert_eq!(request.content().unwrap().as_ref(), b"{\"name\":\"Alice\"}");
        assert_eq!(
            request.server_variables().get("CONTENT_TYPE").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_form_body() {
        let request = BrowserRequest::post("/login")
            .form(&vec![("user", "ada lovelace"), ("pw", "x&y")])
            .build()
            .unwrap();

        assert_eq!(request.content().unwrap().as_ref(), b"user=ada+lovelace&pw=x%26y");
    }

    #[test]
    fn test_form_error_surfaces_on_build() {
        let err = BrowserRequest::post("/")
            .form(&json!({"nested": {"a": 1}}))
            .build()
            .unwrap_err();
        assert!(matches!(err, BrowserError::Form(_)));
    }

    #[test]
    fn test_params_cookies_and_files() {
        let mut fields = FileFields::new();
        fields.insert("tmp_name".to_string(), json!("/tmp/x"));

        let request = BrowserRequest::post("/upload")
            .param("title", "report")
            .params([("a", "1"), ("b", "2")])
            .cookie("session", "abc")
            .file("attachment", fields.clone())
            .build()
            .unwrap();

        assert_eq!(request.parameters().len(), 3);
        assert_eq!(request.cookies().get("session").map(String::as_str), Some("abc"));
        assert_eq!(request.files().get("attachment"), Some(&FileEntry::Fields(fields)));
    }
}
