//! API error type and HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dispenser_core::DispenseError;
use serde::Serialize;

/// Standard JSON error body: `{"status":"error","message":...}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub status: &'static str,
    pub message: String,
}

/// HTTP-facing error; domain errors convert into it via `From`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 503 for connectivity-gated failures.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// 409 when a dispense session is already active.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 400 for invalid request values.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 for unexpected storage faults.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<DispenseError> for ApiError {
    fn from(e: DispenseError) -> Self {
        match e {
            DispenseError::DeviceUnavailable => Self::service_unavailable(e.to_string()),
            DispenseError::SessionActive => Self::conflict(e.to_string()),
            DispenseError::InvalidTarget(msg) => Self::bad_request(msg),
            DispenseError::Storage(msg) => {
                tracing::error!(error = %msg, "storage failure");
                Self::internal(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                status: "error",
                message: self.message,
            }),
        )
            .into_response()
    }
}
