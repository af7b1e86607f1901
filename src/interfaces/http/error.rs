use crate::error::PaymentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PaymentError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PaymentError::Forbidden(_) => StatusCode::FORBIDDEN,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Renders errors as `{"detail": "..."}`. Server-side failures are logged
/// and replaced by a generic message.
impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, PaymentError>;
