//! Core data models: buckets, images, and their classification labels.
//!
//! These map to database tables via `sqlx::FromRow` and serialize naturally
//! as JSON via `serde`.

pub mod bucket;
pub mod image;
pub mod label;
