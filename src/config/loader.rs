//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let name = format!("session-cfg-{}.toml", uuid::Uuid::new_v4());
        let path = std::env::temp_dir().join(name);
        fs::write(
            &path,
            "[api]\nbase_url = \"https://platform.example/api\"\n\n[session]\nprobe_attempts = 3\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_url, "https://platform.example/api");
        assert_eq!(config.session.probe_attempts, 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/session.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = parse_config("[session]\nprobe_attempts = 0\n").unwrap_err();
        match &err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(err.to_string().starts_with("invalid config: "));
                assert!(err.to_string().contains("probe_attempts"));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_all_validation_errors_are_listed() {
        let toml = "[session]\nprobe_attempts = 0\nlogin_url = \"\"\n";
        let message = parse_config(toml).unwrap_err().to_string();
        assert!(message.contains("probe_attempts"), "{message}");
        assert!(message.contains("login_url"), "{message}");
        assert!(message.contains(", "), "{message}");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            parse_config("[session\nprobe_attempts = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
