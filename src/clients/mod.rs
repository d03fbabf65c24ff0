//! External collaborators consumed by the core.
//!
//! Both the classification service and the remote object store are reached
//! over HTTP through narrow trait interfaces so handlers and services never
//! depend on a concrete client. No retries or timeouts are layered on here:
//! the first failure propagates to the caller.

pub mod storage;
pub mod vision;

use thiserror::Error;

/// Failure modes shared by both remote collaborators.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote object not found")]
    NotFound,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Convert a non-success response into `UnexpectedStatus`, keeping a
/// truncated body for the error envelope's `details` field.
pub(crate) async fn unexpected_status(response: reqwest::Response) -> RemoteError {
    let status = response.status().as_u16();
    let mut body = response.text().await.unwrap_or_default();
    body.truncate(512);
    RemoteError::UnexpectedStatus { status, body }
}
