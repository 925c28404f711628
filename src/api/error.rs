//! HTTP error mapping.
//!
//! Every handler returns [`AppResult`]. Errors render as
//! `{ "error": <message>, "code": <CODE> }` with a matching status. Store and
//! configuration failures are logged and replaced with a generic message.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An error from the core.
    #[error(transparent)]
    Core(#[from] Error),

    /// No usable identity on the request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity present but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Convenience alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(err: &Error) -> (StatusCode, &'static str, String) {
    error!(error = %err, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Core(err) => match err {
                Error::DonorNotFound { .. }
                | Error::CampaignNotFound { .. }
                | Error::EventNotFound { .. }
                | Error::DonationNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                Error::InvalidAmount { .. } | Error::Validation { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                Error::Database(_)
                | Error::Config { .. }
                | Error::InvalidRecord { .. }
                | Error::Io(_)
                | Error::IntConversion(_) => internal(err),
            },
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
