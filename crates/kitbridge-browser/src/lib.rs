//! # Kitbridge Browser
//!
//! The framework-neutral side of kitbridge: the request a simulated browser
//! issues and the response it gets back. Neither type knows anything about
//! the application under test; the `kitbridge` connector translates them.
//!
//! ## Example
//!
//! ```
//! use kitbridge_browser::BrowserRequest;
//! use serde_json::json;
//!
//! let request = BrowserRequest::post("http://localhost/users")
//!     .header("Authorization", "Bearer token")
//!     .json(&json!({"name": "Alice"}))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.method(), "POST");
//! assert_eq!(
//!     request.server_variables().get("CONTENT_TYPE").map(String::as_str),
//!     Some("application/json")
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/kitbridge-browser/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod request;
mod response;

pub use error::BrowserError;
pub use request::{BrowserRequest, BrowserRequestBuilder, FileEntry};
pub use response::BrowserResponse;
