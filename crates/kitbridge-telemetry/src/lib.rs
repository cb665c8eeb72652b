//! Logging setup for kitbridge.
//!
//! The bridge itself only emits `tracing` events; this crate installs a
//! subscriber for them. Test suites usually call [`init_logging`] once with
//! [`LogConfig::development`] to see every request that crosses the bridge.
//!
//! # Example
//!
//! ```rust,ignore
//! use kitbridge_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::debug!(http.method = "GET", "Sending request");
//! ```

#![doc(html_root_url = "https://docs.rs/kitbridge-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
