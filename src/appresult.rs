use axum::{http::StatusCode, response::{IntoResponse, Response}};
use tracing::error;

use crate::error::CODE_INVALID_PARAM;

pub type AppResult<T> = Result<T, AppError>;

/// Handler error: a status plus the error whose text becomes the body.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::Error::msg(msg.into()),
        }
    }

    /// Map a nonzero application code from the chat service.
    pub fn from_code(code: i32, msg: String) -> Self {
        let status = if code == CODE_INVALID_PARAM {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            error: anyhow::Error::msg(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("request failed: {:#}", self.error);
        }
        (self.status, format!("{}", self.error)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}
