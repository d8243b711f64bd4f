//! Node configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! `KEYHOLD_*` environment variables (`__` separates nested keys, e.g.
//! `KEYHOLD_HASHER__WORK_FACTOR=3`). Command-line flags are applied last by
//! the binary.

use keyhold_credentials::{CredentialError, HasherConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "KEYHOLD";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    /// Values loaded but out of range.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] CredentialError),
}

/// Configuration for the Keyhold node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listen address.
    pub api_addr: SocketAddr,
    /// Log level.
    pub log_level: String,
    /// Log format (`pretty` or `json`).
    pub log_format: String,
    /// Cost parameters for new credential records.
    pub hasher: HasherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            hasher: HasherConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path` (if it exists) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the node cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hasher.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.api_addr.port(), 8080);
        assert_eq!(config.hasher, HasherConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            Config::load_with_env(Some(Path::new("/nonexistent/keyhold.yaml")), Some(HashMap::new()))
                .unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.hasher, HasherConfig::default());
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "api_addr: \"0.0.0.0:9999\"\nlog_format: json\nhasher:\n  work_factor: 3\n  memory_kib: 1024"
        )
        .unwrap();

        let config = Config::load_with_env(Some(file.path()), Some(HashMap::new())).unwrap();

        assert_eq!(config.api_addr.port(), 9999);
        assert_eq!(config.log_format, "json");
        assert_eq!(config.hasher.work_factor, 3);
        assert_eq!(config.hasher.memory_kib, 1024);
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("KEYHOLD_LOG_LEVEL".to_string(), "debug".to_string()),
            ("KEYHOLD_HASHER__WORK_FACTOR".to_string(), "4".to_string()),
        ]);

        let config = Config::load_with_env(None, Some(env)).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.hasher.work_factor, 4);
        assert_eq!(config.hasher.memory_kib, HasherConfig::default().memory_kib);
    }

    #[test]
    fn test_out_of_range_work_factor_rejected() {
        let env = HashMap::from([("KEYHOLD_HASHER__WORK_FACTOR".to_string(), "0".to_string())]);

        let err = Config::load_with_env(None, Some(env)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(CredentialError::Configuration(_))
        ));
    }

    #[test]
    fn test_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(back.api_addr, Config::default().api_addr);
        assert_eq!(back.hasher, HasherConfig::default());
    }
}
