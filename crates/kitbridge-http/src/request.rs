//! Immutable native request.

use crate::{
    Cookies, Environment, Headers, HttpError, HttpResult, ParsedBody, RequestBody, UploadedFile,
};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Request handed to an [`Application`](crate::Application).
///
/// A `ServerRequest` is never changed in place: every `with_*` method
/// consumes the value and returns the updated copy.
///
/// # Example
///
/// ```
/// use kitbridge_http::{Environment, ServerRequest};
///
/// let env = Environment::mock([("REQUEST_URI", "/users?page=2")]);
/// let request = ServerRequest::from_environment(&env)
///     .unwrap()
///     .with_method("POST")
///     .unwrap();
///
/// assert_eq!(request.method().as_str(), "POST");
/// assert_eq!(request.uri().path(), "/users");
/// assert_eq!(request.query_params().get("page").map(String::as_str), Some("2"));
/// ```
#[derive(Debug, Clone)]
pub struct ServerRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    cookie_params: Cookies,
    server_params: Environment,
    uploaded_files: IndexMap<String, UploadedFile>,
    body: RequestBody,
    parsed_body: Option<ParsedBody>,
    attributes: IndexMap<String, serde_json::Value>,
}

impl ServerRequest {
    /// Seeds a request from server variables.
    ///
    /// Method, URI, headers, cookies and server parameters all come from
    /// `env`; the body starts empty and no files are attached.
    ///
    /// # Errors
    ///
    /// Fails when the method, the assembled URI or a header is invalid.
    pub fn from_environment(env: &Environment) -> HttpResult<Self> {
        let method = parse_method(env.get_or("REQUEST_METHOD", "GET"))?;
        let uri = uri_from_environment(env)?;
        let headers = Headers::from_environment(env);
        let cookie_params = Cookies::parse_header(headers.get_first("cookie").unwrap_or(""));

        let mut header_map = HeaderMap::new();
        for (name, values) in headers.iter() {
            append_values(&mut header_map, name, values)?;
        }

        Ok(Self {
            method,
            uri,
            headers: header_map,
            cookie_params,
            server_params: env.clone(),
            uploaded_files: IndexMap::new(),
            body: RequestBody::new(),
            parsed_body: None,
            attributes: IndexMap::new(),
        })
    }

    /// Replaces the method.
    ///
    /// # Errors
    ///
    /// Fails if `method` is not a valid HTTP token.
    pub fn with_method(mut self, method: &str) -> HttpResult<Self> {
        self.method = parse_method(method)?;
        Ok(self)
    }

    /// Replaces the URI and points the `Host` header at its authority.
    pub fn with_uri(self, uri: Uri) -> Self {
        self.with_uri_preserving_host(uri, false)
    }

    /// Replaces the URI.
    ///
    /// With `preserve_host` the `Host` header is only filled in when it is
    /// missing or empty.
    pub fn with_uri_preserving_host(mut self, uri: Uri, preserve_host: bool) -> Self {
        if let Some(host) = host_header_for(&uri) {
            let current_empty = self
                .headers
                .get(header::HOST)
                .map_or(true, |v| v.as_bytes().is_empty());
            if !preserve_host || current_empty {
                if let Ok(value) = HeaderValue::from_str(&host) {
                    self.headers.insert(header::HOST, value);
                }
            }
        }
        self.uri = uri;
        self
    }

    /// Replaces the uploaded files.
    pub fn with_uploaded_files(mut self, files: IndexMap<String, UploadedFile>) -> Self {
        self.uploaded_files = files;
        self
    }

    /// Replaces the cookie parameters.
    pub fn with_cookie_params(mut self, cookies: impl Into<Cookies>) -> Self {
        self.cookie_params = cookies.into();
        self
    }

    /// Replaces every value of a header.
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    pub fn with_header<I, V>(mut self, name: &str, values: I) -> HttpResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let header_name = parse_header_name(name)?;
        self.headers.remove(&header_name);
        for value in values {
            let value = parse_header_value(name, value.as_ref())?;
            self.headers.append(header_name.clone(), value);
        }
        Ok(self)
    }

    /// Adds a value to a header, keeping the existing ones.
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    pub fn with_added_header(mut self, name: &str, value: &str) -> HttpResult<Self> {
        let header_name = parse_header_name(name)?;
        let value = parse_header_value(name, value)?;
        self.headers.append(header_name, value);
        Ok(self)
    }

    /// Drops a header.
    pub fn without_header(mut self, name: &str) -> Self {
        if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) {
            self.headers.remove(header_name);
        }
        self
    }

    /// Replaces the raw body.
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the parsed body explicitly.
    pub fn with_parsed_body(mut self, parsed: impl Into<ParsedBody>) -> Self {
        self.parsed_body = Some(parsed.into());
        self
    }

    /// Attaches a request attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// All values of a header as text. Non-text values are skipped.
    #[must_use]
    pub fn header(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Header values joined with `", "`, empty when absent.
    #[must_use]
    pub fn header_line(&self, name: &str) -> String {
        self.header(name).join(", ")
    }

    /// Whether a header is present.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Cookie parameters.
    #[must_use]
    pub fn cookie_params(&self) -> &Cookies {
        &self.cookie_params
    }

    /// A single cookie value.
    #[must_use]
    pub fn cookie_param(&self, name: &str) -> Option<&str> {
        self.cookie_params.get(name)
    }

    /// Server parameters the request was seeded from.
    #[must_use]
    pub fn server_params(&self) -> &Environment {
        &self.server_params
    }

    /// A single server parameter.
    #[must_use]
    pub fn server_param(&self, name: &str) -> Option<&str> {
        self.server_params.get(name)
    }

    /// Uploaded files by field name.
    #[must_use]
    pub fn uploaded_files(&self) -> &IndexMap<String, UploadedFile> {
        &self.uploaded_files
    }

    /// The upload for a field.
    #[must_use]
    pub fn uploaded_file(&self, field: &str) -> Option<&UploadedFile> {
        self.uploaded_files.get(field)
    }

    /// Raw body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Media type without parameters, lowercased.
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.content_type()
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase())
            .filter(|mt| !mt.is_empty())
    }

    /// Parsed body.
    ///
    /// An explicitly set body wins. Otherwise JSON and URL-encoded raw bodies
    /// are decoded according to the media type.
    #[must_use]
    pub fn parsed_body(&self) -> Option<Cow<'_, ParsedBody>> {
        if let Some(parsed) = &self.parsed_body {
            return Some(Cow::Borrowed(parsed));
        }
        let media_type = self.media_type()?;
        ParsedBody::parse(&media_type, self.body.as_slice()).map(Cow::Owned)
    }

    /// Whether the request carries a non-empty parsed body.
    #[must_use]
    pub fn has_parsed_body(&self) -> bool {
        self.parsed_body().is_some_and(|p| !p.is_empty())
    }

    /// Query string decoded as key/value pairs; later keys win.
    #[must_use]
    pub fn query_params(&self) -> IndexMap<String, String> {
        self.uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default()
    }

    /// A parameter from the parsed body, falling back to the query string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.parsed_body()
            .and_then(|p| p.field(name))
            .or_else(|| self.query_params().get(name).cloned())
    }

    /// A request attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }
}

fn parse_method(method: &str) -> HttpResult<Method> {
    Method::from_bytes(method.as_bytes()).map_err(|_| HttpError::InvalidMethod(method.to_string()))
}

fn parse_header_name(name: &str) -> HttpResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| HttpError::InvalidHeaderName(name.to_string()))
}

fn parse_header_value(name: &str, value: &str) -> HttpResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| HttpError::invalid_header_value(name))
}

fn append_values(map: &mut HeaderMap, name: &str, values: &[String]) -> HttpResult<()> {
    let header_name = parse_header_name(name)?;
    map.remove(&header_name);
    for value in values {
        map.append(header_name.clone(), parse_header_value(name, value)?);
    }
    Ok(())
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// `Host` header value for a URI: the host, plus the port when it is not
/// the scheme's default.
fn host_header_for(uri: &Uri) -> Option<String> {
    let host = uri.host().filter(|h| !h.is_empty())?;
    let scheme = uri.scheme_str().unwrap_or("http");
    match uri.port_u16() {
        Some(port) if default_port(scheme) != Some(port) => Some(format!("{host}:{port}")),
        _ => Some(host.to_string()),
    }
}

/// Rebuilds the request URI from CGI variables.
fn uri_from_environment(env: &Environment) -> HttpResult<Uri> {
    let scheme = if env.is_https() { "https" } else { "http" };

    let (host, mut port) = match env.get("HTTP_HOST").filter(|h| !h.is_empty()) {
        Some(http_host) => match http_host.rsplit_once(':') {
            Some((h, p)) if !h.ends_with(']') && p.parse::<u16>().is_ok() => {
                (h.to_string(), p.parse::<u16>().ok())
            }
            _ => (http_host.to_string(), None),
        },
        None => (env.get_or("SERVER_NAME", "localhost").to_string(), None),
    };
    if port.is_none() {
        port = env.get("SERVER_PORT").and_then(|p| p.parse().ok());
    }

    let request_uri = env.get_or("REQUEST_URI", "");
    let (path, uri_query) = match request_uri.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (request_uri, None),
    };
    let path = if path.is_empty() { "/" } else { path };
    let query = env
        .get("QUERY_STRING")
        .filter(|q| !q.is_empty())
        .or(uri_query.filter(|q| !q.is_empty()));

    let mut uri = format!("{scheme}://{host}");
    if let Some(port) = port.filter(|p| default_port(scheme) != Some(*p)) {
        uri.push_str(&format!(":{port}"));
    }
    uri.push_str(path);
    if let Some(query) = query {
        uri.push('?');
        uri.push_str(query);
    }

    uri.parse::<Uri>().map_err(|e| HttpError::invalid_uri(uri.clone(), e))
}
