//! Closed error taxonomy for the service, translated to the JSON error
//! envelope `{ "success": false, "error": …, "details"?: … }` at the HTTP
//! boundary. Every variant is matched exhaustively; nothing is swallowed.

use crate::clients::RemoteError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("bucket `{0}` already exists")]
    DuplicateBucketName(String),
    #[error("bucket {0} not found")]
    BucketNotFound(i64),
    #[error("image {0} not found")]
    ImageNotFound(i64),
    #[error("object `{0}` not found in remote storage")]
    RemoteObjectNotFound(String),
    #[error("no storage bucket is available")]
    NoBucketAvailable,
    #[error(
        "insufficient space: required {required_mb:.2} MB, available {available_mb:.2} MB"
    )]
    InsufficientSpace { required_mb: f64, available_mb: f64 },
    #[error("remote service failure")]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::DuplicateBucketName(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::BucketNotFound(_)
            | ServiceError::ImageNotFound(_)
            | ServiceError::RemoteObjectNotFound(_) => StatusCode::NOT_FOUND,
            // capacity failures surface as plain server errors
            ServiceError::NoBucketAvailable | ServiceError::InsufficientSpace { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Remote(_) | ServiceError::Sqlx(_) | ServiceError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Infrastructure failures keep the underlying cause in `details`
        // instead of leaking it as the top-level message.
        let (error, details) = match &self {
            ServiceError::Remote(err) => (self.to_string(), Some(err.to_string())),
            ServiceError::Sqlx(err) => ("internal server error".to_string(), Some(err.to_string())),
            ServiceError::Io(err) => ("internal server error".to_string(), Some(err.to_string())),
            other => (other.to_string(), None),
        };

        if status.is_server_error() {
            tracing::error!(%error, ?details, "request failed");
        } else {
            tracing::debug!(%error, "request rejected");
        }

        let mut body = json!({ "success": false, "error": error });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}
