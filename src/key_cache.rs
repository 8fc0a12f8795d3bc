//! Memo of parsed RSA public keys, keyed by environment name.
//!
//! Only successful parses are stored. A failed parse is returned to the caller
//! and retried on the next request, so the cache never changes what
//! [`crate::rsa_service::encrypt`] would have returned.

use std::collections::HashMap;
use std::sync::RwLock;

use openssl::pkey::Public;
use openssl::rsa::Rsa;

use crate::rsa_service::{EncryptionError, parse_public_key};

#[derive(Debug, Default)]
pub struct KeyCache {
    keys: RwLock<HashMap<String, Rsa<Public>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(
        &self,
        environment: &str,
        public_key_b64: &str,
    ) -> Result<Rsa<Public>, EncryptionError> {
        if let Some(rsa) = self.get(environment) {
            return Ok(rsa);
        }

        let rsa = parse_public_key(public_key_b64)?;
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        let entry = keys.entry(environment.to_string()).or_insert(rsa);
        tracing::debug!(environment, "cached parsed public key");
        Ok(entry.clone())
    }

    fn get(&self, environment: &str) -> Option<Rsa<Public>> {
        self.keys
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(environment)
            .cloned()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
