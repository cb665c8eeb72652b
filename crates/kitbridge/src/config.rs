//! Connector settings.

use http::{HeaderValue, StatusCode};
use kitbridge_config::{ConfigError, KitbridgeConfig};

/// Settings the connector applies to every request.
///
/// Built from a loaded [`KitbridgeConfig`] or left at its defaults: a `200`
/// skeleton response with `Content-Type: text/html; charset=UTF-8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Status of the skeleton response.
    pub status: StatusCode,
    /// `Content-Type` of the skeleton response.
    pub content_type: HeaderValue,
    /// Bytes reserved for each response body.
    pub buffer_capacity: usize,
    /// Log a warning for each upload entry that is dropped.
    pub warn_on_dropped: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: HeaderValue::from_static("text/html; charset=UTF-8"),
            buffer_capacity: 8 * 1024,
            warn_on_dropped: true,
        }
    }
}

impl ConnectorConfig {
    /// Validates `config` and converts it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn from_config(config: &KitbridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let status = StatusCode::from_u16(config.response.status)
            .map_err(|e| ConfigError::invalid_value("response.status", e.to_string()))?;
        let content_type = HeaderValue::from_str(config.response.content_type.trim())
            .map_err(|e| ConfigError::invalid_value("response.content_type", e.to_string()))?;

        Ok(Self {
            status,
            content_type,
            buffer_capacity: config.response.buffer_capacity,
            warn_on_dropped: config.uploads.warn_on_dropped,
        })
    }
}

impl TryFrom<&KitbridgeConfig> for ConnectorConfig {
    type Error = ConfigError;

    fn try_from(config: &KitbridgeConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}
