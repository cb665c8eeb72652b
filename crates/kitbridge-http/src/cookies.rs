//! Request cookie parameters.

use indexmap::IndexMap;

/// Cookie parameters of a request, in header order.
///
/// # Example
///
/// ```
/// use kitbridge_http::Cookies;
///
/// let cookies = Cookies::parse_header("session=abc123; theme=dark");
/// assert_eq!(cookies.get("session"), Some("abc123"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    cookies: IndexMap<String, String>,
}

impl Cookies {
    /// Create an empty set of cookies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` header value.
    ///
    /// Pairs are separated by `;`, names and values are URL-decoded (`+`
    /// decodes to a space), pieces without `=` are skipped and the first
    /// occurrence of a name wins. An empty header yields no cookies. Bytes
    /// that do not decode to UTF-8 are replaced with U+FFFD.
    #[must_use]
    pub fn parse_header(header: &str) -> Self {
        let header = header.trim_end_matches(['\r', '\n']);
        let mut cookies = IndexMap::new();

        for piece in header.split(';') {
            let piece = piece.trim_start();
            if let Some((name, value)) = piece.split_once('=') {
                cookies
                    .entry(url_decode(name))
                    .or_insert_with(|| url_decode(value));
            }
        }

        Self { cookies }
    }

    /// Get a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Check if a cookie exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Get an iterator over all cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if there are no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Borrow the cookies as a map.
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.cookies
    }
}

impl From<IndexMap<String, String>> for Cookies {
    fn from(cookies: IndexMap<String, String>) -> Self {
        Self { cookies }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Cookies {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            cookies: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn url_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
