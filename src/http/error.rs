use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app::tips::TipError;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Maps a service failure; store faults are logged with the request's
    /// tip and caller ids and hidden behind `failed to {action}`.
    pub fn from_tip(
        err: TipError,
        action: &str,
        tip_id: Option<&str>,
        caller_id: Option<&str>,
    ) -> Self {
        match err {
            TipError::NotFound | TipError::CommentNotFound => Self::not_found(err.to_string()),
            TipError::Forbidden => Self::forbidden(err.to_string()),
            TipError::Store(err) => {
                tracing::error!(
                    error = ?err,
                    tip_id = %tip_id.unwrap_or("-"),
                    caller_id = %caller_id.unwrap_or("-"),
                    "failed to {}",
                    action
                );
                Self::internal(format!("failed to {}", action))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
