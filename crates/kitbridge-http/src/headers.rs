//! Header collection derived from a server environment.

use crate::Environment;
use indexmap::IndexMap;

/// CGI variables that carry headers without an `HTTP_` prefix.
const SPECIAL: [&str; 6] = [
    "CONTENT_TYPE",
    "CONTENT_LENGTH",
    "PHP_AUTH_USER",
    "PHP_AUTH_PW",
    "PHP_AUTH_DIGEST",
    "AUTH_TYPE",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    original_key: String,
    values: Vec<String>,
}

/// Ordered, case-insensitive header collection.
///
/// Keys are stored normalized (see [`Headers::normalize_key`]) while the
/// spelling used on first insertion is kept for display. Iteration follows
/// insertion order and a repeated `set` for the same name replaces the
/// previous values in place.
///
/// # Example
///
/// ```
/// use kitbridge_http::{Environment, Headers};
///
/// let env = Environment::mock([("HTTP_X_REQUEST_ID", "abc")]);
/// let headers = Headers::from_environment(&env);
/// assert_eq!(headers.get_first("X-Request-Id"), Some("abc"));
/// assert!(headers.keys().any(|k| k == "x-request-id"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: IndexMap<String, HeaderEntry>,
}

impl Headers {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts headers from `HTTP_*` variables and the special CGI keys.
    ///
    /// `HTTP_CONTENT_LENGTH` is ignored in favour of `CONTENT_LENGTH`. When no
    /// `Authorization` header results, `REDIRECT_HTTP_AUTHORIZATION` is used.
    #[must_use]
    pub fn from_environment(env: &Environment) -> Self {
        let mut headers = Self::new();
        for (key, value) in env.iter() {
            let upper = key.to_ascii_uppercase();
            if upper == "HTTP_CONTENT_LENGTH" {
                continue;
            }
            if upper.starts_with("HTTP_") || SPECIAL.contains(&upper.as_str()) {
                headers.set(key, [value]);
            }
        }

        if !headers.contains("authorization") {
            if let Some(auth) = env.get("REDIRECT_HTTP_AUTHORIZATION") {
                headers.set("Authorization", [auth]);
            }
        }

        headers
    }

    /// Normalizes a header or CGI key: lowercase, `_` becomes `-`, and a
    /// leading `http-` is stripped.
    #[must_use]
    pub fn normalize_key(key: &str) -> String {
        let key = key.to_ascii_lowercase().replace('_', "-");
        match key.strip_prefix("http-") {
            Some(rest) => rest.to_string(),
            None => key,
        }
    }

    /// Replaces all values of a header.
    pub fn set<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        let normalized = Self::normalize_key(key);
        match self.entries.get_mut(&normalized) {
            Some(entry) => entry.values = values,
            None => {
                self.entries.insert(
                    normalized,
                    HeaderEntry {
                        original_key: key.to_string(),
                        values,
                    },
                );
            }
        }
    }

    /// Appends values to a header, creating it if needed.
    pub fn add<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let normalized = Self::normalize_key(key);
        let entry = self
            .entries
            .entry(normalized)
            .or_insert_with(|| HeaderEntry {
                original_key: key.to_string(),
                values: Vec::new(),
            });
        entry.values.extend(values.into_iter().map(Into::into));
    }

    /// Returns all values of a header.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .get(&Self::normalize_key(key))
            .map(|e| e.values.as_slice())
    }

    /// Returns the first value of a header.
    #[must_use]
    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Returns the spelling a header was first inserted with.
    #[must_use]
    pub fn original_key(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&Self::normalize_key(key))
            .map(|e| e.original_key.as_str())
    }

    /// Checks whether a header is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&Self::normalize_key(key))
    }

    /// Removes a header, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries
            .shift_remove(&Self::normalize_key(key))
            .map(|e| e.values)
    }

    /// Normalized header names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(normalized name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.values.as_slice()))
    }

    /// Number of distinct headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(Headers::normalize_key("HTTP_USER_AGENT"), "user-agent");
        assert_eq!(Headers::normalize_key("CONTENT_TYPE"), "content-type");
        assert_eq!(Headers::normalize_key("X-Custom"), "x-custom");
    }

    #[test]
    fn test_from_environment() {
        let env = Environment::new(
            [
                ("HTTP_HOST", "example.com"),
                ("CONTENT_TYPE", "application/json"),
                ("HTTP_CONTENT_LENGTH", "99"),
                ("CONTENT_LENGTH", "12"),
                ("REQUEST_METHOD", "POST"),
                ("HTTP_COOKIE", "a=1"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );

        let headers = Headers::from_environment(&env);
        let keys: Vec<&str> = headers.keys().collect();
        assert_eq!(keys, vec!["host", "content-type", "content-length", "cookie"]);
        assert_eq!(headers.get_first("Content-Length"), Some("12"));
        assert_eq!(headers.original_key("host"), Some("HTTP_HOST"));
        assert!(!headers.contains("request-method"));
    }

    #[test]
    fn test_redirect_authorization() {
        let env = Environment::mock([("REDIRECT_HTTP_AUTHORIZATION", "Bearer xyz")]);
        let headers = Headers::from_environment(&env);
        assert_eq!(headers.get_first("authorization"), Some("Bearer xyz"));

        let env = Environment::mock([
            ("HTTP_AUTHORIZATION", "Basic abc"),
            ("REDIRECT_HTTP_AUTHORIZATION", "Bearer xyz"),
        ]);
        let headers = Headers::from_environment(&env);
        assert_eq!(headers.get_first("authorization"), Some("Basic abc"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.set("Accept", ["text/html"]);
        headers.set("X-One", ["1"]);
        headers.set("accept", ["application/json"]);

        let keys: Vec<&str> = headers.keys().collect();
        assert_eq!(keys, vec!["accept", "x-one"]);
        assert_eq!(headers.get("ACCEPT"), Some(&["application/json".to_string()][..]));
    }

    #[test]
    fn test_add_and_remove() {
        let mut headers = Headers::new();
        headers.add("Vary", ["Accept"]);
        headers.add("vary", ["Origin"]);
        assert_eq!(headers.get("vary").map(<[String]>::len), Some(2));

        assert_eq!(headers.remove("VARY").map(|v| v.len()), Some(2));
        assert!(headers.is_empty());
    }
}
