//! Simulated CGI-style server environment.
//!
//! The native request is always seeded from an [`Environment`]. Tests never
//! read the real process environment: [`Environment::mock`] overlays the
//! caller's server variables on a fixed set of defaults.

use indexmap::IndexMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default `Accept` header of a mocked environment.
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Default `User-Agent` header of a mocked environment.
pub const DEFAULT_USER_AGENT: &str = "kitbridge";

/// Server variables of a single simulated request.
///
/// Keys keep insertion order so that headers derived from the environment
/// are applied in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: IndexMap<String, String>,
}

impl Environment {
    /// Wraps an existing set of server variables without adding defaults.
    #[must_use]
    pub fn new(vars: IndexMap<String, String>) -> Self {
        Self { vars }
    }

    /// Builds a mocked environment.
    ///
    /// User data replaces defaults key by key; keys that are not defaults are
    /// appended after them. When `HTTPS` is set to anything but `off`, or
    /// `REQUEST_SCHEME` is `https`, the default scheme and port switch to
    /// `https` and `443`.
    ///
    /// # Example
    ///
    /// ```
    /// use kitbridge_http::Environment;
    ///
    /// let env = Environment::mock([("REQUEST_METHOD", "POST")]);
    /// assert_eq!(env.get("REQUEST_METHOD"), Some("POST"));
    /// assert_eq!(env.get("SERVER_PORT"), Some("80"));
    /// ```
    pub fn mock<I, K, V>(user_data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let user: IndexMap<String, String> = user_data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let https = is_tls(user.get("HTTPS"), user.get("REQUEST_SCHEME"));
        let (scheme, port) = if https { ("https", "443") } else { ("http", "80") };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let mut vars: IndexMap<String, String> = [
            ("SERVER_PROTOCOL", "HTTP/1.1".to_string()),
            ("REQUEST_METHOD", "GET".to_string()),
            ("REQUEST_SCHEME", scheme.to_string()),
            ("SCRIPT_NAME", String::new()),
            ("REQUEST_URI", String::new()),
            ("QUERY_STRING", String::new()),
            ("SERVER_NAME", "localhost".to_string()),
            ("SERVER_PORT", port.to_string()),
            ("HTTP_HOST", "localhost".to_string()),
            ("HTTP_ACCEPT", DEFAULT_ACCEPT.to_string()),
            ("HTTP_ACCEPT_LANGUAGE", "en-US,en;q=0.8".to_string()),
            ("HTTP_ACCEPT_CHARSET", "ISO-8859-1,utf-8;q=0.7,*;q=0.3".to_string()),
            ("HTTP_USER_AGENT", DEFAULT_USER_AGENT.to_string()),
            ("REMOTE_ADDR", "127.0.0.1".to_string()),
            ("REQUEST_TIME", now.as_secs().to_string()),
            ("REQUEST_TIME_FLOAT", format!("{:.4}", now.as_secs_f64())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        for (key, value) in user {
            vars.insert(key, value);
        }

        Self { vars }
    }

    /// Returns a variable by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns a variable or a fallback.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Checks whether a variable is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Iterates over all variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the environment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Whether the environment describes a TLS request.
    #[must_use]
    pub fn is_https(&self) -> bool {
        is_tls(self.vars.get("HTTPS"), self.vars.get("REQUEST_SCHEME"))
    }

    /// Borrows the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.vars
    }
}

fn is_tls(https: Option<&String>, scheme: Option<&String>) -> bool {
    https.is_some_and(|v| !v.is_empty() && !v.eq_ignore_ascii_case("off"))
        || scheme.is_some_and(|v| v.eq_ignore_ascii_case("https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_defaults() {
        let env = Environment::mock(Vec::<(String, String)>::new());
        assert_eq!(env.get("SERVER_PROTOCOL"), Some("HTTP/1.1"));
        assert_eq!(env.get("REQUEST_METHOD"), Some("GET"));
        assert_eq!(env.get("REQUEST_SCHEME"), Some("http"));
        assert_eq!(env.get("SERVER_PORT"), Some("80"));
        assert_eq!(env.get("HTTP_HOST"), Some("localhost"));
        assert_eq!(env.get("HTTP_USER_AGENT"), Some(DEFAULT_USER_AGENT));
        assert!(env.contains("REQUEST_TIME"));
        assert!(!env.is_https());
    }

    #[test]
    fn test_mock_user_data_overrides_in_place() {
        let env = Environment::mock([("HTTP_HOST", "example.com"), ("X_EXTRA", "1")]);
        assert_eq!(env.get("HTTP_HOST"), Some("example.com"));

        let keys: Vec<&str> = env.iter().map(|(k, _)| k).collect();
        let host_pos = keys.iter().position(|k| *k == "HTTP_HOST").unwrap();
        assert_eq!(host_pos, 8);
        assert_eq!(keys.last(), Some(&"X_EXTRA"));
    }

    #[test]
    fn test_mock_https_defaults() {
        let env = Environment::mock([("HTTPS", "on")]);
        assert_eq!(env.get("REQUEST_SCHEME"), Some("https"));
        assert_eq!(env.get("SERVER_PORT"), Some("443"));
        assert!(env.is_https());

        let env = Environment::mock([("REQUEST_SCHEME", "https")]);
        assert_eq!(env.get("SERVER_PORT"), Some("443"));
    }

    #[test]
    fn test_https_off_is_plain() {
        let env = Environment::mock([("HTTPS", "off")]);
        assert_eq!(env.get("SERVER_PORT"), Some("80"));
        assert!(!env.is_https());
    }

    #[test]
    fn test_new_adds_no_defaults() {
        let env = Environment::new(IndexMap::new());
        assert!(env.is_empty());
        assert_eq!(env.get_or("SERVER_NAME", "none"), "none");
    }
}
