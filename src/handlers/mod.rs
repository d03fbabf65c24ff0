//! HTTP handlers, grouped by resource.

pub mod bucket_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod storage_handlers;

use crate::errors::{ServiceError, ServiceResult};
use axum::extract::Multipart;
use bytes::Bytes;

/// An uploaded file extracted from a multipart request.
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Pull the uploaded file out of a multipart body.
///
/// Takes the first field carrying a file name, so plain `curl -F` uploads
/// work whether or not the field is called `image`.
pub async fn extract_image_field(mut multipart: Multipart) -> ServiceResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServiceError::Validation(format!("malformed multipart body: {err}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|err| ServiceError::Validation(format!("failed to read upload: {err}")))?;

        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(ServiceError::Validation(
        "an image file is required".into(),
    ))
}
