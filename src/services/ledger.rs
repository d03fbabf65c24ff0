//! BucketLedger — durable mapping of bucket identity to remaining capacity,
//! backed by SQLite.
//!
//! All capacity mutations go through guarded SQL so the counter can never go
//! negative and two concurrent reservations can never both succeed against
//! stale state: the debit is `UPDATE … SET free_space_mb = free_space_mb - ?
//! WHERE id = ? AND free_space_mb >= ?`, and a zero row count means the
//! reservation lost.

use crate::errors::{ServiceError, ServiceResult};
use crate::models::bucket::Bucket;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::debug;

/// Capacity assigned to freshly provisioned buckets, in megabytes.
pub const DEFAULT_BUCKET_CAPACITY_MB: f64 = 100.0;

const BUCKET_NAME_MAX_LEN: usize = 255;

/// The collection of all buckets and their free-space counters.
#[derive(Clone)]
pub struct BucketLedger {
    db: Arc<SqlitePool>,
}

impl BucketLedger {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Validate bucket name format.
    ///
    /// Enforces storage-provider-style rules: 1–255 characters, lowercase
    /// letters, digits, dots, hyphens, underscores, and no leading or
    /// trailing dot/hyphen.
    pub fn ensure_bucket_name_safe(name: &str) -> ServiceResult<()> {
        if name.is_empty() || name.len() > BUCKET_NAME_MAX_LEN {
            return Err(ServiceError::Validation(format!(
                "bucket name must be between 1 and {} characters",
                BUCKET_NAME_MAX_LEN
            )));
        }
        if !name
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-' | '_'))
        {
            return Err(ServiceError::Validation(
                "bucket name may only contain lowercase letters, digits, dots, hyphens, and underscores"
                    .into(),
            ));
        }
        if name.starts_with('.') || name.ends_with('.') || name.starts_with('-') || name.ends_with('-')
        {
            return Err(ServiceError::Validation(
                "bucket name must start and end with a lowercase letter or digit".into(),
            ));
        }
        Ok(())
    }

    /// Insert a new bucket with the given starting capacity.
    ///
    /// Fails with `DuplicateBucketName` when the name is taken.
    pub async fn create(&self, name: &str, initial_free_mb: f64) -> ServiceResult<Bucket> {
        Self::ensure_bucket_name_safe(name)?;

        match sqlx::query_as::<_, Bucket>(
            "INSERT INTO buckets (name, free_space_mb) VALUES (?, ?)
             RETURNING id, name, free_space_mb",
        )
        .bind(name)
        .bind(initial_free_mb)
        .fetch_one(&*self.db)
        .await
        {
            Ok(bucket) => Ok(bucket),
            Err(err) if is_unique_violation(&err) => {
                Err(ServiceError::DuplicateBucketName(name.to_string()))
            }
            Err(err) => Err(ServiceError::Sqlx(err)),
        }
    }

    /// Fetch a bucket by id; `BucketNotFound` when missing.
    pub async fn get(&self, id: i64) -> ServiceResult<Bucket> {
        sqlx::query_as::<_, Bucket>("SELECT id, name, free_space_mb FROM buckets WHERE id = ?")
            .bind(id)
            .fetch_one(&*self.db)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => ServiceError::BucketNotFound(id),
                other => ServiceError::Sqlx(other),
            })
    }

    /// The bucket with the numerically largest free space, ties broken by
    /// lowest id; `None` when the ledger is empty.
    pub async fn most_available(&self) -> ServiceResult<Option<Bucket>> {
        let bucket = sqlx::query_as::<_, Bucket>(
            "SELECT id, name, free_space_mb FROM buckets
             ORDER BY free_space_mb DESC, id ASC LIMIT 1",
        )
        .fetch_optional(&*self.db)
        .await?;
        Ok(bucket)
    }

    /// Reserve `required_mb` against the most-available bucket.
    pub async fn reserve(&self, required_mb: f64) -> ServiceResult<Bucket> {
        let mut tx = self.db.begin().await?;
        let bucket = Self::reserve_with(&mut tx, required_mb).await?;
        tx.commit().await?;
        Ok(bucket)
    }

    /// Transactional form of `reserve` so the caller can commit the debit
    /// together with its own bookkeeping rows.
    ///
    /// Fails with `NoBucketAvailable` on an empty ledger and with
    /// `InsufficientSpace` when the chosen bucket cannot hold the object; in
    /// both cases no counter is touched.
    pub async fn reserve_with(
        conn: &mut SqliteConnection,
        required_mb: f64,
    ) -> ServiceResult<Bucket> {
        let candidate = sqlx::query_as::<_, Bucket>(
            "SELECT id, name, free_space_mb FROM buckets
             ORDER BY free_space_mb DESC, id ASC LIMIT 1",
        )
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ServiceError::NoBucketAvailable)?;

        let updated = sqlx::query(
            "UPDATE buckets SET free_space_mb = free_space_mb - ?
             WHERE id = ? AND free_space_mb >= ?",
        )
        .bind(required_mb)
        .bind(candidate.id)
        .bind(required_mb)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ServiceError::InsufficientSpace {
                required_mb,
                available_mb: candidate.free_space_mb,
            });
        }

        debug!(
            bucket = %candidate.name,
            reserved_mb = required_mb,
            remaining_mb = candidate.free_space_mb - required_mb,
            "reserved space"
        );

        Ok(Bucket {
            free_space_mb: candidate.free_space_mb - required_mb,
            ..candidate
        })
    }

    /// Add `amount_mb` back to a bucket's counter.
    pub async fn credit(&self, bucket_id: i64, amount_mb: f64) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;
        Self::credit_with(&mut tx, bucket_id, amount_mb).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Transactional form of `credit`.
    pub async fn credit_with(
        conn: &mut SqliteConnection,
        bucket_id: i64,
        amount_mb: f64,
    ) -> ServiceResult<()> {
        let updated =
            sqlx::query("UPDATE buckets SET free_space_mb = free_space_mb + ? WHERE id = ?")
                .bind(amount_mb)
                .bind(bucket_id)
                .execute(&mut *conn)
                .await?;

        if updated.rows_affected() == 0 {
            return Err(ServiceError::BucketNotFound(bucket_id));
        }
        Ok(())
    }
}

/// Bytes-to-megabytes conversion used for all capacity arithmetic.
/// Exact floating-point division; no rounding before comparison.
pub fn bytes_to_mb(size_bytes: i64) -> f64 {
    size_bytes as f64 / (1024.0 * 1024.0)
}

/// Return true if the SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::test_pool;

    async fn ledger() -> BucketLedger {
        BucketLedger::new(test_pool().await)
    }

    #[tokio::test]
    async fn create_then_most_available_round_trip() {
        let ledger = ledger().await;
        ledger.create("b1", DEFAULT_BUCKET_CAPACITY_MB).await.unwrap();

        let best = ledger.most_available().await.unwrap().unwrap();
        assert_eq!(best.name, "b1");
        assert_eq!(best.free_space_mb, 100.0);
    }

    #[tokio::test]
    async fn most_available_prefers_largest_counter() {
        let ledger = ledger().await;
        ledger.create("small", 10.0).await.unwrap();
        ledger.create("large", 75.0).await.unwrap();
        ledger.create("medium", 40.0).await.unwrap();

        let best = ledger.most_available().await.unwrap().unwrap();
        assert_eq!(best.name, "large");
    }

    #[tokio::test]
    async fn most_available_ties_break_on_lowest_id() {
        let ledger = ledger().await;
        let first = ledger.create("first", 50.0).await.unwrap();
        ledger.create("second", 50.0).await.unwrap();

        let best = ledger.most_available().await.unwrap().unwrap();
        assert_eq!(best.id, first.id);
    }

    #[tokio::test]
    async fn most_available_is_none_on_empty_ledger() {
        let ledger = ledger().await;
        assert!(ledger.most_available().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reserve_debits_exact_amount() {
        let ledger = ledger().await;
        let created = ledger.create("b1", 100.0).await.unwrap();

        let reserved = ledger.reserve(12.5).await.unwrap();
        assert_eq!(reserved.id, created.id);
        assert_eq!(reserved.free_space_mb, 87.5);

        let stored = ledger.get(created.id).await.unwrap();
        assert_eq!(stored.free_space_mb, 87.5);
    }

    #[tokio::test]
    async fn reserve_on_empty_ledger_reports_no_bucket() {
        let ledger = ledger().await;
        let err = ledger.reserve(1.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoBucketAvailable));
    }

    #[tokio::test]
    async fn reserve_over_capacity_fails_and_leaves_counter() {
        let ledger = ledger().await;
        let bucket = ledger.create("b1", 10.0).await.unwrap();

        let err = ledger.reserve(10.5).await.unwrap_err();
        match err {
            ServiceError::InsufficientSpace {
                required_mb,
                available_mb,
            } => {
                assert_eq!(required_mb, 10.5);
                assert_eq!(available_mb, 10.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let stored = ledger.get(bucket.id).await.unwrap();
        assert_eq!(stored.free_space_mb, 10.0);
    }

    #[tokio::test]
    async fn reservation_does_not_spill_to_smaller_buckets() {
        // {A: 50, B: 10}; a 20 MB upload lands in A, and a later 40 MB
        // request fails even though the summed remaining space would fit.
        let ledger = ledger().await;
        let a = ledger.create("a", 50.0).await.unwrap();
        ledger.create("b", 10.0).await.unwrap();

        let chosen = ledger.reserve(20.0).await.unwrap();
        assert_eq!(chosen.id, a.id);
        assert_eq!(chosen.free_space_mb, 30.0);

        let err = ledger.reserve(40.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientSpace { .. }));
        assert_eq!(ledger.get(a.id).await.unwrap().free_space_mb, 30.0);
    }

    #[tokio::test]
    async fn credit_restores_space() {
        let ledger = ledger().await;
        let bucket = ledger.create("b1", 100.0).await.unwrap();
        ledger.reserve(30.0).await.unwrap();

        ledger.credit(bucket.id, 30.0).await.unwrap();
        assert_eq!(ledger.get(bucket.id).await.unwrap().free_space_mb, 100.0);
    }

    #[tokio::test]
    async fn credit_missing_bucket_is_not_found() {
        let ledger = ledger().await;
        let err = ledger.credit(42, 1.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::BucketNotFound(42)));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let ledger = ledger().await;
        ledger.create("b1", 100.0).await.unwrap();

        let err = ledger.create("b1", 100.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateBucketName(name) if name == "b1"));
    }

    #[tokio::test]
    async fn get_missing_bucket_is_not_found() {
        let ledger = ledger().await;
        let err = ledger.get(7).await.unwrap_err();
        assert!(matches!(err, ServiceError::BucketNotFound(7)));
    }

    #[tokio::test]
    async fn bucket_names_are_validated() {
        let ledger = ledger().await;
        for bad in ["", "Has-Upper", "-leading", "trailing.", "spaced name"] {
            let err = ledger.create(bad, 100.0).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn bytes_to_mb_is_exact_division() {
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mb(20 * 1024 * 1024), 20.0);
        assert_eq!(bytes_to_mb(512 * 1024), 0.5);
    }
}
