use axum::extract::rejection::{PathRejection, QueryRejection, StringRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Envelope returned for every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
}

impl AppError {
    /// HTTP status associated with each error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedInput(_)
            | AppError::Validation(_)
            | AppError::InvalidCollectionName(_) => StatusCode::BAD_REQUEST,
            AppError::ReadOnlyCollection(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PersistFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Build the client-facing body. Store and internal details stay in the logs.
    pub fn to_body(&self) -> ErrorBody {
        let (message, errors) = match self {
            AppError::Validation(errors) => ("Validation error".to_string(), errors.clone()),
            AppError::MalformedInput(msg) => ("Malformed input".to_string(), vec![msg.clone()]),
            AppError::InvalidCollectionName(msg) => {
                ("Invalid collection name".to_string(), vec![msg.clone()])
            }
            AppError::ReadOnlyCollection(msg) => {
                ("Collection is read-only".to_string(), vec![msg.clone()])
            }
            AppError::NotFound(msg) => (msg.clone(), vec![msg.clone()]),
            AppError::StoreUnavailable(_) => (
                "Document store unavailable. Please try again later.".to_string(),
                vec!["Store unavailable".to_string()],
            ),
            AppError::PersistFailed(_) | AppError::Internal(_) => (
                "Internal server error. Please try again later.".to_string(),
                vec!["Server error occurred".to_string()],
            ),
        };

        ErrorBody {
            success: false,
            message,
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{self}");
        } else {
            tracing::warn!(status = status.as_u16(), "{self}");
        }

        (status, axum::Json(self.to_body())).into_response()
    }
}

// Extractor failures are reported in the same envelope as every other error.

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}

impl From<StringRejection> for AppError {
    fn from(rejection: StringRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}
