use alert_archive_core::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error, warn};

pub const UNEXPECTED_MESSAGE: &str = "An unexpected error has occurred.";

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: &'static str,
    message: Vec<String>,
}

/// Every failure leaves the service as
/// `{"success":false,"error":{"type":"...","message":["..."]}}`.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Failures outside the core (task panics, unreadable bodies). The detail
    /// is logged, never returned.
    Unexpected(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            Self::Core(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if err.is_integrity_fault() {
                    error!(error = %err, kind = err.kind(), "archive integrity fault");
                } else if status.is_server_error() {
                    warn!(error = %err, kind = err.kind(), "request failed upstream");
                } else {
                    debug!(error = %err, kind = err.kind(), "request rejected");
                }
                (status, err.kind(), err.message_args())
            }
            Self::Unexpected(detail) => {
                error!(detail = %detail, "unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UnexpectedError",
                    vec![UNEXPECTED_MESSAGE.to_string()],
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: ErrorDetail { kind, message },
            }),
        )
            .into_response()
    }
}
