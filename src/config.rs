//! Startup configuration: command-line options and the environments file.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("environment entry {index} has an empty name")]
    EmptyName { index: usize },

    #[error("environment {0:?} is configured more than once")]
    DuplicateName(String),

    #[error("invalid public key for environment(s): {}", .0.join(", "))]
    InvalidKeys(Vec<String>),
}

/// Command-line options, each with an environment variable fallback.
#[derive(Debug, Clone, Parser)]
#[command(name = "sessionkey-service", version, about = "Encrypts API keys under per-environment RSA public keys")]
pub struct ServerArgs {
    /// Path to the environments file
    #[arg(short, long, env = "SESSIONKEY_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "SESSIONKEY_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Refuse to start if any configured public key fails to parse
    #[arg(long, env = "SESSIONKEY_STRICT_KEYS")]
    pub strict_keys: bool,

    /// Keep parsed public keys in memory between requests
    #[arg(long, env = "SESSIONKEY_CACHE_KEYS")]
    pub cache_keys: bool,
}

// One configured environment and its base64 DER public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            environments = config.environments.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.check_names()?;
        Ok(config)
    }

    fn check_names(&self) -> Result<(), ConfigError> {
        if self.environments.is_empty() {
            tracing::warn!("configuration lists no environments; every request will be rejected");
        }

        let mut seen = HashSet::new();
        for (index, env) in self.environments.iter().enumerate() {
            if env.name.is_empty() {
                return Err(ConfigError::EmptyName { index });
            }
            if !seen.insert(env.name.as_str()) {
                return Err(ConfigError::DuplicateName(env.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_environment_list() {
        let config = AppConfig::from_json(
            r#"{"environments":[{"name":"prod","publicKey":"AAAA"},{"name":"dev","publicKey":"BBBB"}]}"#,
        )
        .unwrap();

        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.environments[0].name, "prod");
        assert_eq!(config.environments[1].public_key, "BBBB");
    }

    #[test]
    fn missing_environments_field_is_empty() {
        let config = AppConfig::from_json("{}").unwrap();
        assert!(config.environments.is_empty());
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = AppConfig::from_json("{ environments: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = AppConfig::from_json(
            r#"{"environments":[{"name":"prod","publicKey":"A"},{"name":"prod","publicKey":"B"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "prod"));
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = AppConfig::from_json(
            r#"{"environments":[{"name":"prod","publicKey":"A"},{"name":"","publicKey":"B"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName { index: 1 }));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"environments":[{{"name":"qa","publicKey":"CCCC"}}]}}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.environments[0].name, "qa");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn args_have_defaults() {
        let args = ServerArgs::try_parse_from(["sessionkey-service"]).unwrap();
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(args.listen, DEFAULT_LISTEN_ADDR.parse::<SocketAddr>().unwrap());
        assert!(!args.strict_keys);
        assert!(!args.cache_keys);
    }

    #[test]
    fn args_accept_overrides() {
        let args = ServerArgs::try_parse_from([
            "sessionkey-service",
            "--config",
            "/etc/keys.json",
            "--listen",
            "127.0.0.1:9000",
            "--strict-keys",
            "--cache-keys",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/keys.json"));
        assert_eq!(args.listen.port(), 9000);
        assert!(args.strict_keys);
        assert!(args.cache_keys);
    }
}
