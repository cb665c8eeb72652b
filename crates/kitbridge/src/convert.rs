//! Conversion between browser and native messages.

use crate::config::ConnectorConfig;
use crate::error::BridgeResult;
use crate::upload::convert_files;
use http::{Method, Uri};
use indexmap::IndexMap;
use kitbridge_browser::{BrowserRequest, BrowserResponse};
use kitbridge_http::{
    Cookies, Environment, Headers, HttpError, RequestBody, ServerRequest, ServerResponse,
};
use std::borrow::Cow;
use std::io::Write;
use tracing::trace;

/// Builds native requests from browser requests.
#[derive(Debug, Clone, Copy)]
pub struct RequestConverter<'a> {
    config: &'a ConnectorConfig,
}

impl<'a> RequestConverter<'a> {
    /// Creates a converter using the given settings.
    #[must_use]
    pub fn new(config: &'a ConnectorConfig) -> Self {
        Self { config }
    }

    /// Converts `request` into a [`ServerRequest`].
    ///
    /// The environment is simulated from the request's server variables and
    /// headers only. Updates are applied in a fixed order: method, URI,
    /// uploads, cookies, headers, body, then the parsed body. Parameters
    /// become the parsed body of non-GET requests unless the raw body already
    /// decodes to something non-empty. Characters a URI may not contain, such
    /// as spaces, are percent-encoded before the URI is parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI, method or a header is malformed.
    pub fn convert(&self, request: &BrowserRequest) -> BridgeResult<ServerRequest> {
        let env = Environment::mock(request.server_variables());

        let uri: Uri = encode_uri(request.uri())
            .parse()
            .map_err(|e| HttpError::invalid_uri(request.uri(), e))?;

        let headers = Headers::from_environment(&env);
        let cookies = Cookies::parse_header(headers.get_first("cookie").unwrap_or(""));

        let mut native = ServerRequest::from_environment(&env)?
            .with_method(request.method())?
            .with_uri(uri)
            .with_uploaded_files(convert_files(request.files(), self.config.warn_on_dropped))
            .with_cookie_params(cookies);

        for (name, values) in headers.iter() {
            native = native.with_header(name, values)?;
        }

        if let Some(content) = request.content() {
            let mut body = RequestBody::new();
            body.write_all(content).map_err(HttpError::from)?;
            body.rewind();
            native = native.with_body(body);
        }

        let candidate: IndexMap<String, String> = if *native.method() == Method::GET {
            IndexMap::new()
        } else {
            request.parameters().clone()
        };

        let needs_parsed_body = native.parsed_body().map_or(true, |body| body.is_empty());
        if needs_parsed_body {
            native = native.with_parsed_body(candidate);
        }

        trace!(
            http.method = %native.method(),
            http.uri = %native.uri(),
            headers = native.headers().len(),
            uploads = native.uploaded_files().len(),
            "Native request built"
        );

        Ok(native)
    }
}

/// Percent-encodes every byte a URI may not contain. Existing escapes are
/// kept as they are.
fn encode_uri(raw: &str) -> Cow<'_, str> {
    if raw.bytes().all(is_uri_byte) {
        return Cow::Borrowed(raw);
    }
    let mut encoded = String::with_capacity(raw.len() + 8);
    for byte in raw.bytes() {
        if is_uri_byte(byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    Cow::Owned(encoded)
}

/// Unreserved and reserved URI characters, plus `%`.
fn is_uri_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=%".contains(&byte)
}

/// Builds browser responses from native responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseConverter;

impl ResponseConverter {
    /// Converts `response` into a [`BrowserResponse`].
    ///
    /// The body is read in full as lossy UTF-8. Every header value is copied,
    /// grouped by name in first-seen order.
    #[must_use]
    pub fn convert(&self, response: ServerResponse) -> BrowserResponse {
        let (status, headers, body) = response.into_parts();

        let mut converted: IndexMap<String, Vec<String>> = IndexMap::with_capacity(headers.keys_len());
        for (name, value) in &headers {
            converted
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        BrowserResponse::new(body.contents(), status.as_u16(), converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use kitbridge_http::{ParsedBody, Stream};
    use serde_json::json;

    fn convert(request: &BrowserRequest) -> ServerRequest {
        RequestConverter::new(&ConnectorConfig::default())
            .convert(request)
            .unwrap()
    }

    #[test]
    fn test_encode_uri() {
        assert!(matches!(encode_uri("/a/b?c=d%20e"), Cow::Borrowed(_)));
        assert_eq!(encode_uri("/search?q=hello world"), "/search?q=hello%20world");
        assert_eq!(encode_uri("/caf\u{e9}"), "/caf%C3%A9");
    }

    #[test]
    fn test_get_ignores_parameters() {
        let request = BrowserRequest::get("http://localhost/search?q=rust")
            .param("ignored", "yes")
            .build()
            .unwrap();

        let native = convert(&request);
        assert_eq!(native.method(), &Method::GET);
        assert_eq!(native.uri().path(), "/search");
        assert_eq!(native.query_params().get("q").map(String::as_str), Some("rust"));
        let parsed = native.parsed_body().unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_post_parameters_become_parsed_body() {
        let request = BrowserRequest::post("/login")
            .param("user", "ada")
            .param("pw", "secret")
            .build()
            .unwrap();

        let native = convert(&request);
        let parsed = native.parsed_body().unwrap();
        assert_eq!(parsed.field("user").as_deref(), Some("ada"));
        assert_eq!(parsed.field("pw").as_deref(), Some("secret"));
    }

    #[test]
    fn test_json_body_kept_over_parameters() {
        let request = BrowserRequest::post("/users")
            .json(&json!({"name": "Alice"}))
            .param("name", "Bob")
            .build()
            .unwrap();

        let native = convert(&request);
        assert_eq!(native.body().contents(), r#"{"name":"Alice"}"#);
        let parsed = native.parsed_body().unwrap();
        assert_eq!(parsed.as_ref(), &ParsedBody::Json(json!({"name": "Alice"})));
    }

    #[test]
    fn test_empty_json_body_replaced_by_parameters() {
        let request = BrowserRequest::post("/users")
            .content_type("application/json")
            .content("{}")
            .param("name", "Bob")
            .build()
            .unwrap();

        let native = convert(&request);
        assert_eq!(native.parsed_body().unwrap().field("name").as_deref(), Some("Bob"));
    }

    #[test]
    fn test_headers_and_cookies() {
        let request = BrowserRequest::get("/")
            .header("X-Trace", "abc")
            .header("Cookie", "a=1; b=2")
            .build()
            .unwrap();

        let native = convert(&request);
        assert_eq!(native.header_line("x-trace"), "abc");
        assert_eq!(native.cookie_param("a"), Some("1"));
        assert_eq!(native.cookie_param("b"), Some("2"));
        assert_eq!(native.header_line("user-agent"), "kitbridge");
    }

    #[test]
    fn test_server_variables_override_defaults() {
        let request = BrowserRequest::get("/")
            .server("HTTP_HOST", "example.test")
            .server("REMOTE_ADDR", "10.0.0.7")
            .build()
            .unwrap();

        let native = convert(&request);
        assert_eq!(native.header_line("host"), "example.test");
        assert_eq!(native.server_param("REMOTE_ADDR"), Some("10.0.0.7"));
    }

    #[test]
    fn test_invalid_uri() {
        let request = BrowserRequest::get("http://[::1").build().unwrap();
        let err = RequestConverter::new(&ConnectorConfig::default())
            .convert(&request)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::BridgeError::Http(HttpError::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_response_conversion() {
        let mut headers = HeaderMap::new();
        headers.append("x-test", HeaderValue::from_static("1"));
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        let response = ServerResponse::new(StatusCode::CREATED, headers, Stream::from_bytes("ok"));

        let converted = ResponseConverter.convert(response);
        assert_eq!(converted.status(), 201);
        assert_eq!(converted.content(), "ok");
        assert_eq!(converted.header("X-Test"), Some("1"));
        assert_eq!(converted.header_values("set-cookie"), ["a=1", "b=2"]);
    }
}
