use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use scds_sdk::ScdsError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Scds(#[from] ScdsError),

    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Scds(e) => match e {
                ScdsError::InvalidKey(_) | ScdsError::Parse(_) => StatusCode::BAD_REQUEST,
                ScdsError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ScdsError::NotFound(_) => StatusCode::NO_CONTENT,
                ScdsError::StorageConflict(_) => StatusCode::CONFLICT,
                ScdsError::Storage(_) | ScdsError::Gate(_) | ScdsError::Ledger(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Scds(ScdsError::NotFound(_)) => status.into_response(),
            Self::Scds(ScdsError::ValidationFailed(errors)) => {
                (status, Json(json!({ "errors": errors }))).into_response()
            }
            other => {
                if status.is_server_error() {
                    error!(error = %other, "request failed");
                }
                (status, Json(json!({ "error": other.to_string() }))).into_response()
            }
        }
    }
}
