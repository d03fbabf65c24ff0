//! Handlers for the raw storage pass-through (no classification, no ledger
//! bookkeeping).

use crate::{
    errors::ServiceError,
    handlers::extract_image_field,
    services::image_service::ImageService,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

/// POST `/storage/upload` — raw upload to the most-available bucket.
pub async fn upload_raw(
    State(service): State<ImageService>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let upload = extract_image_field(multipart).await?;
    let stored = service
        .raw_upload(&upload.file_name, upload.content_type.as_deref(), upload.data)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "image uploaded",
            "data": { "fileName": stored.key, "publicUrl": stored.public_url }
        })),
    ))
}

/// DELETE `/storage/{fileName}` — raw delete.
pub async fn delete_raw(
    State(service): State<ImageService>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    service.raw_delete(&file_name).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "image deleted",
            "data": { "fileName": file_name }
        })),
    ))
}
