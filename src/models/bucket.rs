//! Represents a storage bucket with a tracked free-space counter.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named storage area registered in the capacity ledger.
///
/// The counter is in megabytes and never goes negative: every decrement is
/// guarded by a conditional update at the storage layer.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Bucket {
    /// Generated row id, also the deterministic tie-break when two buckets
    /// report the same free space.
    pub id: i64,

    /// Globally unique bucket name (at most 255 characters).
    pub name: String,

    /// Remaining capacity in megabytes.
    pub free_space_mb: f64,
}
