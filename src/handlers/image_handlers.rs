//! Handlers for the classified-image pipeline and its queries.

use crate::{
    errors::ServiceError,
    handlers::extract_image_field,
    services::image_service::ImageService,
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LabelQuery {
    pub tag: Option<String>,
}

/// POST `/images/process` — upload, classify, store remotely, and record.
pub async fn process_image(
    State(service): State<ImageService>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let upload = extract_image_field(multipart).await?;
    let result = service
        .process_and_save(&upload.file_name, upload.content_type.as_deref(), upload.data)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": result })),
    ))
}

/// GET `/images?page=&limit=` — paginated listing, newest first.
pub async fn list_images(
    State(service): State<ImageService>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let listing = service.list(page, limit).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": listing })),
    ))
}

/// GET `/images/by-label?tag=` — case-insensitive label filter.
pub async fn find_by_label(
    State(service): State<ImageService>,
    Query(query): Query<LabelQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let tag = query
        .tag
        .ok_or_else(|| ServiceError::Validation("the `tag` query parameter is required".into()))?;
    let details = service.find_by_label(&tag).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": details })),
    ))
}

/// DELETE `/images/id/{imageId}` — delete by id and credit the bucket.
pub async fn delete_image(
    State(service): State<ImageService>,
    Path(image_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let image = service.delete_image(image_id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "image deleted",
            "data": { "imageId": image.id, "fileName": image.file_name }
        })),
    ))
}
