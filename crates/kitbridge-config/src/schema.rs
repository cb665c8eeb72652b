//! Configuration schema types.
//!
//! This module defines the structure of every configuration section.

use kitbridge_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Defaults for the skeleton response handed to the application.
///
/// # Example
///
/// ```
/// use kitbridge_config::ResponseDefaults;
///
/// let defaults = ResponseDefaults::default();
/// assert_eq!(defaults.status, 200);
/// assert_eq!(defaults.content_type, "text/html; charset=UTF-8");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResponseDefaults {
    /// Status code the application starts from.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Initial `Content-Type` header.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Bytes reserved up front for the response body buffer.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for ResponseDefaults {
    fn default() -> Self {
        Self {
            status: default_status(),
            content_type: default_content_type(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

fn default_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "text/html; charset=UTF-8".to_string()
}

fn default_buffer_capacity() -> usize {
    8 * 1024
}

/// Handling of upload descriptors that cannot be converted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UploadPolicy {
    /// Emit a warning for each dropped upload.
    #[serde(default = "default_true")]
    pub warn_on_dropped: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            warn_on_dropped: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (CI).
    #[default]
    Json,
    /// Human-readable pretty format (local runs).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingSection {
    /// Converts this section into the settings `init_logging` expects.
    ///
    /// # Example
    ///
    /// ```
    /// use kitbridge_config::{LogFormat, LoggingSection};
    ///
    /// let section = LoggingSection {
    ///     format: LogFormat::Pretty,
    ///     ..Default::default()
    /// };
    /// assert!(!section.to_log_config().json_format);
    /// ```
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            file_line_info: self.include_location,
            ..LogConfig::default()
        }
    }
}
