//! # Kitbridge
//!
//! **Drive an in-process web application from a simulated browser.**
//!
//! A [`Connector`] takes a framework-neutral [`BrowserRequest`], rebuilds it
//! as a native [`ServerRequest`](kitbridge_http::ServerRequest) from a
//! simulated server environment, hands it to the configured
//! [`Application`](kitbridge_http::Application) together with a skeleton
//! response, and converts whatever comes back into a [`BrowserResponse`].
//! No socket is opened and nothing runs asynchronously.
//!
//! ```text
//! BrowserRequest → RequestConverter → ServerRequest → Application::process
//!                                                          ↓
//! BrowserResponse ← ResponseConverter ← ServerResponse ←───┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use kitbridge::prelude::*;
//!
//! let mut connector = Connector::new();
//! connector.configure(application_fn(|req, res| {
//!     let theme = req.cookie_param("theme").unwrap_or("light").to_string();
//!     Ok(res.with_header("X-Theme", &theme)?.write("ok")?)
//! }));
//!
//! let response = connector
//!     .get("http://localhost/settings")
//!     .header("Cookie", "theme=dark")
//!     .send();
//!
//! response.assert_success().assert_header("x-theme", "dark");
//! ```

#![doc(html_root_url = "https://docs.rs/kitbridge/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod connector;
mod convert;
mod error;
mod stream;
mod upload;

pub use config::ConnectorConfig;
pub use connector::{Connector, ConnectorRequest};
pub use convert::{RequestConverter, ResponseConverter};
pub use error::{BridgeError, BridgeResult};
pub use stream::{AllocatorFn, MemoryAllocator, StreamAllocator};
pub use upload::{classify_upload, convert_files, RawUploadMetadata, UploadClass};

pub use kitbridge_browser::{BrowserRequest, BrowserResponse};

// Re-export the member crates
pub use kitbridge_browser as browser;
pub use kitbridge_config as config_loader;
pub use kitbridge_http as native;
pub use kitbridge_telemetry as telemetry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{BridgeError, Connector, ConnectorConfig};
    pub use kitbridge_browser::{BrowserRequest, BrowserResponse, FileEntry};
    pub use kitbridge_http::{
        application_fn, Application, ServerRequest, ServerResponse, UploadedFile,
    };
}
