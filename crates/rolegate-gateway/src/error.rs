//! Gateway error surfaces: fatal startup errors and per-request responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use rolegate_core::RoleGateError;

/// Fatal errors raised before the server accepts traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("config: {0}")]
    Config(#[source] RoleGateError),
    #[error("{0}")]
    Plugin(#[source] RoleGateError),
    #[error("route {route}: {source}")]
    Route {
        route: String,
        #[source]
        source: RoleGateError,
    },
}

impl StartupError {
    /// Underlying core error.
    pub fn core(&self) -> &RoleGateError {
        match self {
            StartupError::Config(e) | StartupError::Plugin(e) => e,
            StartupError::Route { source, .. } => source,
        }
    }
}

/// Per-request terminal error rendered as JSON.
///
/// Deny reasons stay in logs; the body only carries a fixed message so
/// clients learn nothing about the policy.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RoleGateError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self.0 {
            RoleGateError::Forbidden(_) => "Unauthorized".to_string(),
            RoleGateError::BadRequest(m) => m.clone(),
            _ => "Internal error".to_string(),
        };
        let body = json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "code": code.as_str(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
