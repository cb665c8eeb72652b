//! Typed configuration for the kitbridge connector.
//!
//! # Configuration File Format
//!
//! ```toml
//! [response]
//! status = 200
//! content_type = "text/html; charset=UTF-8"
//! buffer_capacity = 8192
//!
//! [uploads]
//! warn_on_dropped = true
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables, for
//! example `KITBRIDGE__RESPONSE__STATUS=404` or
//! `KITBRIDGE__UPLOADS__WARN_ON_DROPPED=false`.

#![doc(html_root_url = "https://docs.rs/kitbridge-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{KitbridgeConfig, KitbridgeConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingSection, ResponseDefaults, UploadPolicy};

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "KITBRIDGE";
