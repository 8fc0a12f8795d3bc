use serde::{Deserialize, Serialize};

// Request/Response models for the session key endpoint

// Model for encryption request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncryptRequest {
    #[serde(default)]
    pub env: String,
    #[serde(default, rename = "apiKey")]
    pub api_key: String,
}

// Model for encryption response
#[derive(Debug, Deserialize, Serialize)]
pub struct EncryptResponse {
    #[serde(rename = "sessionKey")]
    pub session_key: String,
}

// Model for error responses
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Model for service health
#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environments: usize,
}
