//! Represents one uploaded image tracked by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata row for a stored image.
///
/// The row is inserted with an empty `url` before the remote upload runs
/// (Pending) and updated with the public URL once the upload succeeds
/// (Stored). Deleting the row cascades to its labels and credits the owning
/// bucket.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Image {
    /// Generated row id.
    pub id: i64,

    /// Owning bucket.
    pub bucket_id: i64,

    /// Original file name, reused as the remote object key.
    pub file_name: String,

    /// Payload size in bytes; capacity arithmetic divides by 1024 * 1024.
    pub size_bytes: i64,

    /// Public URL, empty until the remote upload is confirmed.
    pub url: String,

    /// When this row was inserted.
    pub created_at: DateTime<Utc>,
}
