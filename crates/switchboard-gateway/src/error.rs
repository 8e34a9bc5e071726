//! Mapping the kernel error taxonomy onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use switchboard_core::ApiError;

/// Wire-facing error wrapper.
///
/// Body shape: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug)]
pub struct GatewayError(pub ApiError);

impl From<ApiError> for GatewayError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.kind.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = json!({
            "error": { "code": self.0.kind.as_str(), "message": self.0.message }
        });
        (status, Json(body)).into_response()
    }
}

/// Handler result alias.
pub type GatewayResult<T> = Result<T, GatewayError>;
