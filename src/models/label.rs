//! Represents a classification result attached to an image.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One label produced by the classification service for an image.
///
/// Labels are owned exclusively by their image and removed with it.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Label {
    /// Generated row id.
    pub id: i64,

    /// Owning image.
    pub image_id: i64,

    /// Label name as reported by the classifier.
    pub name: String,

    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}
