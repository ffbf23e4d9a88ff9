//! Error types for the caching gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gateway Error Enum ==
/// Unified error type for the caching gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request could not be turned into an upstream fetch
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream network fetch failed
    #[error("Network error: {0}")]
    Network(String),

    /// Network failed and no offline fallback was cached
    #[error("Offline: {0}")]
    Offline(String),

    /// Internal storage or conversion error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::Network(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            GatewayError::Offline(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            GatewayError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
