use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;
use std::time::Instant;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::{EncryptRequest, EncryptResponse, HealthResponse};
use crate::rsa_service::EncryptionError;

pub async fn hello() -> &'static str {
    "Hello, World!"
}

// Service health check
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environments: state.registry.len(),
    })
}

// Handler to encrypt an API key under the requested environment's public key.
// The body is decoded as JSON whatever the Content-Type header says.
pub async fn encrypt(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<EncryptResponse>> {
    let start = Instant::now();

    let request: EncryptRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("rejected request body: {}", e);
        ApiError::InvalidBody
    })?;

    let session_key = encrypt_session_key(&state, &request)?;

    // Record operation timing
    let elapsed = start.elapsed();
    tracing::debug!(env = %request.env, ?elapsed, "encrypt operation finished");

    Ok(Json(EncryptResponse { session_key }))
}

/// Resolve-then-encrypt for one request, with every failure logged once.
pub fn encrypt_session_key(state: &AppState, request: &EncryptRequest) -> ApiResult<String> {
    let Some(public_key) = state.registry.resolve(&request.env) else {
        tracing::info!(env = %request.env, "request for unknown environment");
        return Err(ApiError::UnknownEnvironment);
    };

    state
        .rsa
        .encrypt(&request.env, public_key, &request.api_key)
        .map_err(|e| {
            match &e {
                EncryptionError::PlaintextTooLarge { len, max } => {
                    tracing::warn!(env = %request.env, len, max, "{}", e)
                }
                err if err.is_misconfiguration() => {
                    tracing::error!(env = %request.env, error = ?err, "misconfigured public key: {}", err)
                }
                err => tracing::error!(env = %request.env, error = ?err, "{}", err),
            }
            ApiError::from(e)
        })
}
