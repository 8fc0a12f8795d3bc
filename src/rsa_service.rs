use base64::{Engine as _, engine::general_purpose::STANDARD};
use openssl::pkey::{Id, PKey, Public};
use openssl::rsa::{Padding, Rsa};
use thiserror::Error;

use crate::key_cache::KeyCache;

/// PKCS#1 v1.5 padding overhead in bytes.
pub const PKCS1_PADDING_OVERHEAD: usize = 11;

// Error type for the encryption pipeline; the Display text is what callers see
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Error decoding base64-encoded public key")]
    Decode(#[from] base64::DecodeError),

    #[error("Error parsing public key")]
    Parse(#[source] openssl::error::ErrorStack),

    #[error("Error parsing public key")]
    TrailingData { trailing: usize },

    #[error("Error converting to RSA public key")]
    KeyType(Id),

    #[error("API key too large for public key")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("Error encrypting access token")]
    Encryption(#[source] openssl::error::ErrorStack),
}

impl EncryptionError {
    /// True when the failure points at a bad configured key rather than the request.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            EncryptionError::Decode(_)
                | EncryptionError::Parse(_)
                | EncryptionError::TrailingData { .. }
                | EncryptionError::KeyType(_)
        )
    }
}

/// Decodes and parses a base64 DER SubjectPublicKeyInfo into an RSA public key.
/// The input must be strict standard base64 holding exactly one SPKI structure.
pub fn parse_public_key(public_key_b64: &str) -> Result<Rsa<Public>, EncryptionError> {
    let der = STANDARD.decode(public_key_b64)?;
    let pkey = PKey::public_key_from_der(&der).map_err(EncryptionError::Parse)?;

    if pkey.id() != Id::RSA {
        return Err(EncryptionError::KeyType(pkey.id()));
    }

    // OpenSSL stops after the outer SEQUENCE; re-encoding gives its length
    let consumed = pkey.public_key_to_der().map_err(EncryptionError::Parse)?.len();
    if der.len() > consumed {
        return Err(EncryptionError::TrailingData {
            trailing: der.len() - consumed,
        });
    }

    pkey.rsa().map_err(EncryptionError::Parse)
}

/// Largest plaintext, in bytes, that PKCS#1 v1.5 can carry for this key.
pub fn max_plaintext_len(rsa: &Rsa<Public>) -> usize {
    (rsa.size() as usize).saturating_sub(PKCS1_PADDING_OVERHEAD)
}

/// PKCS#1 v1.5 encryption with an already parsed key. Padding bytes come from
/// OpenSSL's CSPRNG on every call.
pub fn encrypt_with_key(rsa: &Rsa<Public>, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let max = max_plaintext_len(rsa);
    if plaintext.len() > max {
        return Err(EncryptionError::PlaintextTooLarge {
            len: plaintext.len(),
            max,
        });
    }

    let mut buf = vec![0; rsa.size() as usize];
    let encrypted_len = rsa
        .public_encrypt(plaintext, &mut buf, Padding::PKCS1)
        .map_err(EncryptionError::Encryption)?;
    buf.truncate(encrypted_len);

    Ok(buf)
}

/// Encrypts `plaintext` under the base64 DER public key and returns the
/// ciphertext as standard base64.
pub fn encrypt(public_key_b64: &str, plaintext: &str) -> Result<String, EncryptionError> {
    let rsa = parse_public_key(public_key_b64)?;
    let encrypted = encrypt_with_key(&rsa, plaintext.as_bytes())?;
    Ok(STANDARD.encode(encrypted))
}

// Stateless apart from the optional parsed-key cache
#[derive(Debug, Default)]
pub struct RsaService {
    cache: Option<KeyCache>,
}

impl RsaService {
    pub fn new() -> Self {
        Self { cache: None }
    }

    pub fn with_cache() -> Self {
        Self {
            cache: Some(KeyCache::new()),
        }
    }

    pub fn cache(&self) -> Option<&KeyCache> {
        self.cache.as_ref()
    }

    /// Same contract as [`encrypt`]; with a cache, the parsed key is reused per environment.
    pub fn encrypt(
        &self,
        environment: &str,
        public_key_b64: &str,
        plaintext: &str,
    ) -> Result<String, EncryptionError> {
        match &self.cache {
            None => encrypt(public_key_b64, plaintext),
            Some(cache) => {
                let rsa = cache.get_or_parse(environment, public_key_b64)?;
                let encrypted = encrypt_with_key(&rsa, plaintext.as_bytes())?;
                Ok(STANDARD.encode(encrypted))
            }
        }
    }
}
