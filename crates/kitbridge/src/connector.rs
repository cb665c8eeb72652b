//! The connector between a simulated browser and an in-process application.

use crate::config::ConnectorConfig;
use crate::convert::{RequestConverter, ResponseConverter};
use crate::error::{BridgeError, BridgeResult};
use crate::stream::{MemoryAllocator, StreamAllocator};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use kitbridge_browser::{BrowserRequest, BrowserRequestBuilder, BrowserResponse, FileEntry};
use kitbridge_http::{Application, ServerResponse};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, error};

/// Sends browser requests straight into an [`Application`], without a socket.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use kitbridge::Connector;
/// use kitbridge_http::application_fn;
///
/// let mut connector = Connector::new();
/// connector.configure(application_fn(|req, res| {
///     let name = req.parsed_body().and_then(|b| b.field("name")).unwrap_or_default();
///     Ok(res.with_status(StatusCode::CREATED).write(format!("hello {name}"))?)
/// }));
///
/// let response = connector.post("/users").param("name", "ada").send();
/// response.assert_status(201).assert_body_eq("hello ada");
/// ```
#[derive(Clone)]
pub struct Connector {
    app: Option<Arc<dyn Application>>,
    config: ConnectorConfig,
    allocator: Arc<dyn StreamAllocator>,
    default_headers: Vec<(String, String)>,
}

impl Default for Connector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector {
    /// Creates an unconfigured connector with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ConnectorConfig::default())
    }

    /// Creates an unconfigured connector with the given settings.
    #[must_use]
    pub fn with_config(config: ConnectorConfig) -> Self {
        let allocator = Arc::new(MemoryAllocator::new(config.buffer_capacity));
        Self {
            app: None,
            config,
            allocator,
            default_headers: Vec::new(),
        }
    }

    /// Replaces the response body allocator.
    #[must_use]
    pub fn with_allocator(mut self, allocator: impl StreamAllocator + 'static) -> Self {
        self.allocator = Arc::new(allocator);
        self
    }

    /// Adds a header to every request built with the fluent methods.
    #[must_use]
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the application requests are sent to.
    pub fn configure(&mut self, app: impl Application + 'static) {
        self.app = Some(Arc::new(app));
    }

    /// Sets an application that is shared with other owners.
    pub fn configure_shared(&mut self, app: Arc<dyn Application>) {
        self.app = Some(app);
    }

    /// Whether an application is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.app.is_some()
    }

    /// Settings in use.
    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Converts `request`, runs the application and converts its response.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotConfigured`] if no application is set.
    /// - [`BridgeError::Http`] if the request cannot be expressed natively.
    /// - [`BridgeError::StreamAllocation`] if the response body cannot be
    ///   created; the application is not invoked.
    /// - [`BridgeError::Application`] with whatever the application returned.
    pub fn send(&self, request: &BrowserRequest) -> BridgeResult<BrowserResponse> {
        let app = self.app.as_ref().ok_or(BridgeError::NotConfigured)?;

        let span = debug_span!(
            "kitbridge.send",
            http.method = %request.method(),
            http.uri = %request.uri()
        );
        let _guard = span.enter();

        let native = RequestConverter::new(&self.config).convert(request)?;

        let body = self.allocator.allocate().map_err(|e| {
            error!(error = %e, "Failed to allocate response body");
            BridgeError::StreamAllocation(e.to_string())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, self.config.content_type.clone());
        let response = ServerResponse::new(self.config.status, headers, body);

        let response = app.process(native, response).map_err(|e| {
            debug!(error = %e, "Application returned an error");
            BridgeError::Application(e)
        })?;

        let response = ResponseConverter.convert(response);
        debug!(http.status_code = response.status(), "Response received");
        Ok(response)
    }

    /// Creates a GET request bound to this connector.
    pub fn get(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::get(uri))
    }

    /// Creates a POST request bound to this connector.
    pub fn post(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::post(uri))
    }

    /// Creates a PUT request bound to this connector.
    pub fn put(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::put(uri))
    }

    /// Creates a PATCH request bound to this connector.
    pub fn patch(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::patch(uri))
    }

    /// Creates a DELETE request bound to this connector.
    pub fn delete(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::delete(uri))
    }

    /// Creates an OPTIONS request bound to this connector.
    pub fn options(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::options(uri))
    }

    /// Creates a HEAD request bound to this connector.
    pub fn head(&self, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::head(uri))
    }

    /// Creates a request with a custom method bound to this connector.
    pub fn request(&self, method: impl AsRef<str>, uri: impl AsRef<str>) -> ConnectorRequest<'_> {
        ConnectorRequest::new(self, BrowserRequest::builder(method, uri))
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("configured", &self.app.is_some())
            .field("config", &self.config)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A browser request being built against a [`Connector`].
pub struct ConnectorRequest<'a> {
    connector: &'a Connector,
    builder: BrowserRequestBuilder,
    cookies: Vec<String>,
}

impl<'a> ConnectorRequest<'a> {
    fn new(connector: &'a Connector, builder: BrowserRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &connector.default_headers {
            builder = builder.header(name, value);
        }
        Self {
            connector,
            builder,
            cookies: Vec::new(),
        }
    }

    /// Adds a header value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets a server variable.
    pub fn server(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.server(key, value);
        self
    }

    /// Adds a cookie.
    ///
    /// Cookies are sent in the `Cookie` header, after any cookies set
    /// explicitly with [`header`](Self::header).
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.cookies.push(format!("{name}={value}"));
        self.builder = self.builder.cookie(name, value);
        self
    }

    /// Adds a form parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.param(name, value);
        self
    }

    /// Attaches an upload.
    pub fn file(mut self, field: impl Into<String>, entry: impl Into<FileEntry>) -> Self {
        self.builder = self.builder.file(field, entry);
        self
    }

    /// Sets the raw body.
    pub fn content(mut self, content: impl Into<Bytes>) -> Self {
        self.builder = self.builder.content(content);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the body as a URL-encoded form.
    pub fn form<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sends the request, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or sent.
    pub fn send(self) -> BrowserResponse {
        match self.try_send() {
            Ok(response) => response,
            Err(e) => panic!("request should succeed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    pub fn try_send(self) -> BridgeResult<BrowserResponse> {
        let mut builder = self.builder;
        if !self.cookies.is_empty() {
            builder = builder.header("Cookie", self.cookies.join("; "));
        }
        let request = builder.build()?;
        self.connector.send(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::AllocatorFn;
    use http::StatusCode;
    use kitbridge_http::application_fn;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo() -> Connector {
        let mut connector = Connector::new();
        connector.configure(application_fn(|req, res| {
            let body = format!("{} {}", req.method(), req.uri().path());
            Ok(res.write(body)?)
        }));
        connector
    }

    #[test]
    fn test_not_configured() {
        let connector = Connector::new();
        assert!(!connector.is_configured());
        let request = BrowserRequest::get("/").build().unwrap();
        assert!(matches!(
            connector.send(&request),
            Err(BridgeError::NotConfigured)
        ));
    }

    #[test]
    fn test_skeleton_response_defaults() {
        let mut connector = Connector::new();
        connector.configure(application_fn(|_req, res| Ok(res)));

        let response = connector.get("/").send();
        response
            .assert_status(200)
            .assert_header("content-type", "text/html; charset=UTF-8")
            .assert_body_eq("");
    }

    #[test]
    fn test_all_methods() {
        let connector = echo();
        assert_eq!(connector.get("/a").send().content(), "GET /a");
        assert_eq!(connector.post("/a").send().content(), "POST /a");
        assert_eq!(connector.put("/a").send().content(), "PUT /a");
        assert_eq!(connector.patch("/a").send().content(), "PATCH /a");
        assert_eq!(connector.delete("/a").send().content(), "DELETE /a");
        assert_eq!(connector.options("/a").send().content(), "OPTIONS /a");
        assert_eq!(connector.head("/a").send().content(), "HEAD /a");
        assert_eq!(connector.request("PURGE", "/a").send().content(), "PURGE /a");
    }

    #[test]
    fn test_default_headers() {
        let mut connector = Connector::new().with_default_header("X-Custom", "default-value");
        connector.configure(application_fn(|req, res| {
            let value = req.header_line("x-custom");
            Ok(res.write(value)?)
        }));

        assert_eq!(connector.get("/").send().content(), "default-value");
    }

    #[test]
    fn test_bearer_token_reaches_application() {
        let mut connector = Connector::new();
        connector.configure(application_fn(|req, res| {
            let value = req.header_line("authorization");
            Ok(res.write(value)?)
        }));

        let response = connector.get("/").bearer_token("my_token").send();
        assert_eq!(response.content(), "Bearer my_token");
    }

    #[test]
    fn test_allocation_failure_skips_application() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut connector = Connector::new().with_allocator(AllocatorFn::new(|| {
            Err(io::Error::new(io::ErrorKind::OutOfMemory, "exhausted"))
        }));
        connector.configure(application_fn(move |_req, res| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(res)
        }));

        let err = connector.get("/").try_send().unwrap_err();
        assert!(matches!(err, BridgeError::StreamAllocation(ref m) if m == "exhausted"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_application_error_passes_through() {
        let mut connector = Connector::new();
        connector.configure(application_fn(|_req, _res| Err("handler exploded".into())));

        let err = connector.get("/").try_send().unwrap_err();
        assert_eq!(
            err.application_error().map(ToString::to_string),
            Some("handler exploded".to_string())
        );
    }

    #[test]
    fn test_configured_status_and_content_type() {
        let config = ConnectorConfig {
            status: StatusCode::ACCEPTED,
            content_type: http::HeaderValue::from_static("application/json"),
            ..Default::default()
        };
        let mut connector = Connector::with_config(config);
        connector.configure(application_fn(|_req, res| Ok(res)));

        connector
            .get("/")
            .send()
            .assert_status(202)
            .assert_content_type("application/json");
    }

    #[test]
    fn test_configure_shared() {
        let app: Arc<dyn Application> =
            Arc::new(application_fn(|_req, res| Ok(res.with_status(StatusCode::IM_A_TEAPOT))));

        let mut first = Connector::new();
        let mut second = Connector::new();
        first.configure_shared(Arc::clone(&app));
        second.configure_shared(app);

        assert_eq!(first.get("/").send().status(), 418);
        assert_eq!(second.get("/").send().status(), 418);
    }

    #[test]
    fn test_invalid_method_from_fluent_api() {
        let connector = echo();
        let err = connector.request("", "/").try_send().unwrap_err();
        assert!(matches!(err, BridgeError::Browser(_)));

        let err = connector.request("BAD METHOD", "/").try_send().unwrap_err();
        assert!(matches!(err, BridgeError::Http(_)));
    }

    #[test]
    fn test_fluent_cookies_reach_application() {
        let mut connector = Connector::new();
        connector.configure(application_fn(|req, res| {
            let cookies: Vec<String> = req
                .cookie_params()
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect();
            Ok(res.write(cookies.join(","))?)
        }));

        connector
            .get("/")
            .cookie("a", "1")
            .cookie("b", "2")
            .send()
            .assert_body_eq("a:1,b:2");
    }
}
