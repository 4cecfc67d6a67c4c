// Error taxonomy for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Remediation hint attached to every access-denied response.
pub const ACCESS_DENIED_HINT: &str = "Access Denied. Ensure the service role has permissions \
     and the S3 bucket does not have conflicting policies.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// JSON body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                ErrorBody {
                    message: msg.clone(),
                    error: None,
                }
            }
            AppError::AccessDenied(detail) => ErrorBody {
                message: format!("{} Error: {}", ACCESS_DENIED_HINT, detail),
                error: None,
            },
            AppError::Internal(detail) => ErrorBody {
                message: "Internal Server Error".to_string(),
                error: Some(detail.clone()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AccessDenied(msg) => AppError::AccessDenied(msg),
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::Provider(msg) => AppError::Internal(msg),
        }
    }
}
