//! File and dotenv layering tests.

use kitbridge_config::{ConfigError, ConfigLoader, LogFormat};
use std::io::Write;

#[test]
fn loads_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
        [response]
        status = 201
        content_type = "application/json"

        [logging]
        format = "pretty"
        "#
    )
    .unwrap();

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.response.status, 201);
    assert_eq!(config.response.content_type, "application/json");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.uploads.warn_on_dropped);
}

#[test]
fn loads_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"response": {{"buffer_capacity": 16}}}}"#).unwrap();

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.response.buffer_capacity, 16);
}

#[test]
fn rejects_unknown_extension() {
    let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn rejects_unknown_fields_in_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[uploads]\nwarn_on_dropped = true\nstrict = true").unwrap();

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn dotenv_file_feeds_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "KBDOTENVTEST__RESPONSE__STATUS=418").unwrap();
    writeln!(file, "KBDOTENVTEST__UPLOADS__WARN_ON_DROPPED=no").unwrap();

    let config = ConfigLoader::new()
        .with_dotenv_file(file.path())
        .unwrap()
        .with_env_prefix("KBDOTENVTEST")
        .load()
        .unwrap();

    assert_eq!(config.response.status, 418);
    assert!(!config.uploads.warn_on_dropped);
}

#[test]
fn missing_dotenv_file_is_an_error() {
    let result = ConfigLoader::new().with_dotenv_file("/nonexistent/.env");
    assert!(matches!(result, Err(ConfigError::Dotenv(_))));
}
