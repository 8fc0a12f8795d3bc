//! Encrypts API keys under per-environment RSA public keys, served over HTTP.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod key_cache;
pub mod models;
pub mod registry;
pub mod rsa_service;

// Re-export important types for easier use
pub use app::{AppState, build_state, create_router};
pub use config::{AppConfig, ConfigError, EnvironmentConfig, ServerArgs};
pub use error::ApiError;
pub use models::{EncryptRequest, EncryptResponse, ErrorResponse};
pub use registry::EnvironmentRegistry;
pub use rsa_service::{EncryptionError, RsaService, encrypt};
