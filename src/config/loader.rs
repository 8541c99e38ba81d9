//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::args::ConfigOverrides;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ConfigWarning, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated configuration plus the non-fatal problems found in it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ProxyConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Parse a TOML file into a configuration, without validation.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: defaults, then the optional file,
/// then overrides. The result is normalized and validated.
pub fn load_config(overrides: &ConfigOverrides) -> Result<LoadedConfig, ConfigError> {
    let mut config = match &overrides.config {
        Some(path) => read_config_file(path)?,
        None => ProxyConfig::default(),
    };

    overrides.apply(&mut config);
    config.upstream.normalize();

    let warnings = validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::AuthMode;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_file_with_overrides() {
        let file = write_config(
            r#"
            service_name = "solar-proxy"

            [listener]
            port = 9100

            [upstream]
            base_url = "http://192.168.1.20/"
            auth_mode = "cookie-login"
            password = "from-file"
            "#,
        );

        let overrides = ConfigOverrides {
            config: Some(file.path().to_path_buf()),
            password: Some("from-env".into()),
            ..Default::default()
        };

        let loaded = load_config(&overrides).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config.service_name, "solar-proxy");
        assert_eq!(loaded.config.listener.port, 9100);
        assert_eq!(loaded.config.upstream.base_url, "http://192.168.1.20");
        assert_eq!(loaded.config.upstream.auth_mode, Some(AuthMode::CookieLogin));
        assert_eq!(loaded.config.upstream.password.as_deref(), Some("from-env"));
        assert_eq!(loaded.config.upstream.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let file = write_config("[upstream\nbase_url = 1");
        let overrides = ConfigOverrides {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(load_config(&overrides), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let overrides = ConfigOverrides {
            config: Some("/nonexistent/auth-proxy.toml".into()),
            ..Default::default()
        };
        let err = load_config(&overrides).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/auth-proxy.toml"));
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let overrides = ConfigOverrides {
            upstream_url: Some("localhost".into()),
            ..Default::default()
        };
        let err = load_config(&overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: upstream base URL"));
    }
}
