//! Route table for the image façade.
//!
//! ## Structure
//! - **Image endpoints**
//!   - `POST   /images/process` — upload + classify + store + record
//!   - `GET    /images` — paginated listing (`page`, `limit`)
//!   - `GET    /images/by-label?tag=` — case-insensitive label filter
//!   - `DELETE /images/id/{imageId}` — delete by id, credit the bucket
//!
//! - **Raw storage endpoints** (no classification, no bookkeeping)
//!   - `POST   /storage/upload`
//!   - `DELETE /storage/{fileName}`
//!
//! - **Bucket endpoints**
//!   - `GET    /bucket/max-space` — inspect the most-available bucket
//!   - `POST   /bucket/create` — provision + register a bucket

use crate::{
    handlers::{
        bucket_handlers::{create_bucket, max_space},
        health_handlers::{healthz, readyz},
        image_handlers::{delete_image, find_by_label, list_images, process_image},
        storage_handlers::{delete_raw, upload_raw},
    },
    services::image_service::ImageService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the router; shared state (`ImageService`) flows to every handler.
pub fn routes() -> Router<ImageService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // image pipeline + queries
        .route("/images/process", post(process_image))
        .route("/images", get(list_images))
        .route("/images/by-label", get(find_by_label))
        .route("/images/id/{image_id}", delete(delete_image))
        // raw storage pass-through
        .route("/storage/upload", post(upload_raw))
        .route("/storage/{file_name}", delete(delete_raw))
        // bucket ledger
        .route("/bucket/max-space", get(max_space))
        .route("/bucket/create", post(create_bucket))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
