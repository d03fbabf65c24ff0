//! Handlers for bucket inspection and provisioning.

use crate::{errors::ServiceError, services::image_service::ImageService};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CreateBucketReq {
    pub name: Option<String>,
}

/// GET `/bucket/max-space` — the bucket with the most free space.
pub async fn max_space(
    State(service): State<ImageService>,
) -> Result<impl IntoResponse, ServiceError> {
    match service.max_space().await? {
        Some(bucket) => Ok((
            StatusCode::OK,
            Json(json!({ "success": true, "data": bucket })),
        )),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "no bucket with available space was found"
            })),
        )),
    }
}

/// POST `/bucket/create` — provision remotely, then register in the ledger.
pub async fn create_bucket(
    State(service): State<ImageService>,
    Json(payload): Json<CreateBucketReq>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = payload
        .name
        .ok_or_else(|| ServiceError::Validation("a bucket name is required".into()))?;
    let bucket = service.create_bucket(&name).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "bucket created",
            "data": bucket
        })),
    ))
}
