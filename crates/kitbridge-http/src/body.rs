//! Parsed request bodies.
//!
//! A request's parsed body is either set explicitly or decoded on demand
//! from the raw body, based on the request media type.

use indexmap::IndexMap;

/// Media type decoded as JSON.
pub const JSON: &str = "application/json";

/// Media type decoded as URL-encoded form fields.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decoded request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// Form fields, in submission order.
    Form(IndexMap<String, String>),
    /// A JSON document.
    Json(serde_json::Value),
}

impl ParsedBody {
    /// Whether the body carries no data.
    ///
    /// Empty forms, `null`, `false`, and empty strings, arrays or objects
    /// all count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Form(fields) => fields.is_empty(),
            Self::Json(value) => match value {
                serde_json::Value::Null | serde_json::Value::Bool(false) => true,
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(a) => a.is_empty(),
                serde_json::Value::Object(o) => o.is_empty(),
                _ => false,
            },
        }
    }

    /// The form fields, if this is a form body.
    #[must_use]
    pub fn as_form(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Self::Form(fields) => Some(fields),
            Self::Json(_) => None,
        }
    }

    /// The JSON document, if this is a JSON body.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Form(_) => None,
        }
    }

    /// Looks up a top-level field as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        match self {
            Self::Form(fields) => fields.get(name).cloned(),
            Self::Json(value) => value.get(name).map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    /// Decodes `body` for the given media type (without parameters).
    ///
    /// Returns `None` for unsupported media types and undecodable payloads.
    #[must_use]
    pub fn parse(media_type: &str, body: &[u8]) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        let media: mime::Mime = media_type.parse().ok()?;
        let is_json = media.essence_str() == JSON
            || media.suffix().is_some_and(|s| s.as_str() == "json");

        if is_json {
            serde_json::from_slice(body).ok().map(Self::Json)
        } else if media.essence_str() == FORM_URLENCODED {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
                .ok()
                .map(|pairs| Self::Form(pairs.into_iter().collect()))
        } else {
            None
        }
    }
}

impl From<IndexMap<String, String>> for ParsedBody {
    fn from(fields: IndexMap<String, String>) -> Self {
        Self::Form(fields)
    }
}

impl From<serde_json::Value> for ParsedBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}
