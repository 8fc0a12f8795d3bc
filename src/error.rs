//! HTTP-facing error type.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::rsa_service::EncryptionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid environment")]
    UnknownEnvironment,

    #[error("Invalid request body")]
    InvalidBody,

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownEnvironment | ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::Encryption(EncryptionError::PlaintextTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Encryption(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
