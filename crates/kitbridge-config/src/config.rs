//! Main configuration types.
//!
//! This module provides the top-level [`KitbridgeConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingSection, ResponseDefaults, UploadPolicy};

/// Complete kitbridge connector configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use kitbridge_config::KitbridgeConfig;
///
/// let config = KitbridgeConfig::default();
/// assert_eq!(config.response.status, 200);
/// assert!(config.uploads.warn_on_dropped);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct KitbridgeConfig {
    /// Skeleton response defaults.
    #[serde(default)]
    pub response: ResponseDefaults,

    /// Upload conversion policy.
    #[serde(default)]
    pub uploads: UploadPolicy,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl KitbridgeConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> KitbridgeConfigBuilder {
        KitbridgeConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The default status is outside 100..=999
    /// - The default content type is empty or not a media type
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=999).contains(&self.response.status) {
            return Err(ConfigError::invalid_value(
                "response.status",
                format!("must be between 100 and 999, got {}", self.response.status),
            ));
        }

        let content_type = self.response.content_type.trim();
        if content_type.is_empty() {
            return Err(ConfigError::invalid_value(
                "response.content_type",
                "must not be empty",
            ));
        }
        if content_type.parse::<mime::Mime>().is_err() {
            return Err(ConfigError::invalid_value(
                "response.content_type",
                format!("not a media type: {content_type}"),
            ));
        }

        if let Err(e) = kitbridge_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Debug-level pretty logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use kitbridge_config::KitbridgeConfig;
    ///
    /// let config = KitbridgeConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Create a CI configuration preset.
    ///
    /// Info-level JSON logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}

/// Builder for [`KitbridgeConfig`].
#[derive(Debug, Default)]
pub struct KitbridgeConfigBuilder {
    response: Option<ResponseDefaults>,
    uploads: Option<UploadPolicy>,
    logging: Option<LoggingSection>,
}

impl KitbridgeConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response defaults.
    #[must_use]
    pub fn response(mut self, response: ResponseDefaults) -> Self {
        self.response = Some(response);
        self
    }

    /// Set the upload policy.
    #[must_use]
    pub fn uploads(mut self, uploads: UploadPolicy) -> Self {
        self.uploads = Some(uploads);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSection) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> KitbridgeConfig {
        KitbridgeConfig {
            response: self.response.unwrap_or_default(),
            uploads: self.uploads.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<KitbridgeConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(KitbridgeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_sections() {
        let config = KitbridgeConfig::builder()
            .response(ResponseDefaults {
                status: 204,
                ..Default::default()
            })
            .uploads(UploadPolicy {
                warn_on_dropped: false,
            })
            .build();

        assert_eq!(config.response.status, 204);
        assert!(!config.uploads.warn_on_dropped);
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    fn test_validate_status_range() {
        let result = KitbridgeConfig::builder()
            .response(ResponseDefaults {
                status: 42,
                ..Default::default()
            })
            .build_validated();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("response.status"));
    }

    #[test]
    fn test_validate_content_type() {
        let empty = KitbridgeConfig::builder()
            .response(ResponseDefaults {
                content_type: "  ".to_string(),
                ..Default::default()
            })
            .build();
        assert!(empty.validate().unwrap_err().to_string().contains("must not be empty"));

        let garbage = KitbridgeConfig::builder()
            .response(ResponseDefaults {
                content_type: "not a type".to_string(),
                ..Default::default()
            })
            .build();
        assert!(garbage.validate().unwrap_err().to_string().contains("content_type"));
    }

    #[test]
    fn test_validate_log_level() {
        let config = KitbridgeConfig::builder()
            .logging(LoggingSection {
                level: "kitbridge=loud".to_string(),
                ..Default::default()
            })
            .build();

        assert!(config.validate().unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_presets() {
        let dev = KitbridgeConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.logging.include_location);

        let prod = KitbridgeConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert_eq!(prod.logging.level, "info");
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&KitbridgeConfig::default()).unwrap();
        assert!(toml_str.contains("[response]"));
        assert!(toml_str.contains("[uploads]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml_str = r#"
            [response]
            status = 200
            unknown_field = "value"
        "#;

        let result: Result<KitbridgeConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }
}
