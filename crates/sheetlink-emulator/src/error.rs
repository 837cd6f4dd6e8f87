use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sheetlink_core::{RemoteErrorBody, RemoteErrorDetail};
use thiserror::Error;

/// Application error type, rendered the way the real service reports errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Requested entity was not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Quota exceeded for spreadsheet {0}")]
    RateLimited(String),

    #[error("Invalid JSON payload: {0}")]
    Payload(#[from] JsonRejection),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InvalidArgument(_) | AppError::Payload(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT")
            }
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RESOURCE_EXHAUSTED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error encountered.".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(RemoteErrorBody {
            error: RemoteErrorDetail {
                code: status.as_u16(),
                message,
                status: code.to_string(),
            },
        });

        (status, body).into_response()
    }
}
