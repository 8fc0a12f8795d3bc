//! Shared request state and router construction.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ConfigError, ServerArgs};
use crate::handlers::{encrypt, health, hello};
use crate::registry::EnvironmentRegistry;
use crate::rsa_service::RsaService;

/// Immutable after construction; handlers only read from it.
#[derive(Debug)]
pub struct AppState {
    pub registry: EnvironmentRegistry,
    pub rsa: RsaService,
}

impl AppState {
    pub fn new(registry: EnvironmentRegistry, rsa: RsaService) -> Self {
        Self { registry, rsa }
    }
}

/// Loads the environments file and checks every key. Bad keys are logged, and
/// fatal only with `strict_keys`.
pub fn build_state(args: &ServerArgs) -> Result<AppState, ConfigError> {
    let config = AppConfig::load(&args.config)?;
    let registry = EnvironmentRegistry::from(config);

    let failures = registry.validate();
    for (name, err) in &failures {
        tracing::warn!(env = %name, error = ?err, "public key will not be usable: {}", err);
    }
    if args.strict_keys && !failures.is_empty() {
        return Err(ConfigError::InvalidKeys(
            failures.into_iter().map(|(name, _)| name).collect(),
        ));
    }

    let rsa = if args.cache_keys {
        RsaService::with_cache()
    } else {
        RsaService::new()
    };

    tracing::info!(
        environments = ?registry.names().collect::<Vec<_>>(),
        cache_keys = args.cache_keys,
        "environment registry ready"
    );

    Ok(AppState::new(registry, rsa))
}

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/hello", get(hello))
        .route("/health", get(health))
        .route("/encrypt", post(encrypt))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}
