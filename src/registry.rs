//! Read-only mapping from environment name to its base64 DER public key.

use crate::config::{AppConfig, EnvironmentConfig};
use crate::rsa_service::{EncryptionError, parse_public_key};

/// Built once at startup and shared across request handlers without locking.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentRegistry {
    entries: Vec<EnvironmentConfig>,
}

impl EnvironmentRegistry {
    pub fn new(entries: Vec<EnvironmentConfig>) -> Self {
        Self { entries }
    }

    /// First entry whose name matches exactly. Empty names and empty keys resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|env| env.name == name)
            .map(|env| env.public_key.as_str())
            .filter(|key| !key.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|env| env.name.as_str())
    }

    /// Parses every configured key and returns the entries that fail.
    pub fn validate(&self) -> Vec<(String, EncryptionError)> {
        self.entries
            .iter()
            .filter_map(|env| {
                parse_public_key(&env.public_key)
                    .err()
                    .map(|err| (env.name.clone(), err))
            })
            .collect()
    }
}

impl From<AppConfig> for EnvironmentRegistry {
    fn from(config: AppConfig) -> Self {
        Self::new(config.environments)
    }
}
