//! ImageService — the upload/classify/store/record pipeline plus image
//! queries, delegating capacity decisions to `BucketLedger` and remote work
//! to the collaborator traits.

use crate::clients::{
    RemoteError,
    storage::{RemoteStore, StoredUpload},
    vision::LabelDetector,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{bucket::Bucket, image::Image, label::Label};
use crate::services::ledger::{BucketLedger, DEFAULT_BUCKET_CAPACITY_MB, bytes_to_mb};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Full result of the processing pipeline, returned to the client.
#[derive(Debug, Serialize)]
pub struct ProcessedImage {
    pub image: Image,
    pub labels: Vec<Label>,
    pub bucket: Bucket,
    pub storage: StoredUpload,
}

/// An image joined with its bucket and labels, as returned by the
/// label filter.
#[derive(Debug, Serialize)]
pub struct ImageDetail {
    pub image: Image,
    pub bucket: Bucket,
    pub labels: Vec<Label>,
}

/// One page of the image listing.
#[derive(Debug, Serialize)]
pub struct ImagePage {
    pub images: Vec<Image>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct ImageService {
    pub db: Arc<SqlitePool>,
    pub ledger: BucketLedger,
    detector: Arc<dyn LabelDetector>,
    store: Arc<dyn RemoteStore>,
    min_confidence: f64,
    pub upload_dir: PathBuf,
}

impl ImageService {
    pub fn new(
        db: Arc<SqlitePool>,
        detector: Arc<dyn LabelDetector>,
        store: Arc<dyn RemoteStore>,
        min_confidence: f64,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ledger: BucketLedger::new(db.clone()),
            db,
            detector,
            store,
            min_confidence,
            upload_dir: upload_dir.into(),
        }
    }

    fn ensure_supported_mime(content_type: Option<&str>) -> ServiceResult<()> {
        match content_type {
            Some(mime) if ALLOWED_MIME_TYPES.contains(&mime) => Ok(()),
            _ => Err(ServiceError::Validation(
                "invalid file type: only JPEG, PNG, GIF, or WEBP images are accepted".into(),
            )),
        }
    }

    /// Reject file names that could smuggle path separators toward the
    /// remote store.
    fn ensure_file_name_safe(file_name: &str) -> ServiceResult<()> {
        if file_name.is_empty()
            || !file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(ServiceError::Validation("invalid file name".into()));
        }
        Ok(())
    }

    /// Spool an upload to the temp directory and return its path and size.
    ///
    /// The pipeline sizes the object from the spooled file, not the request
    /// body.
    async fn spool_upload(&self, data: &Bytes) -> ServiceResult<(PathBuf, i64)> {
        fs::create_dir_all(&self.upload_dir).await?;
        let tmp_path = self.upload_dir.join(format!(".upload-{}", Uuid::new_v4()));
        fs::write(&tmp_path, data).await?;
        let size_bytes = fs::metadata(&tmp_path).await?.len() as i64;
        Ok((tmp_path, size_bytes))
    }

    /// Temp-file cleanup is non-fatal: failures are logged and ignored.
    async fn cleanup_temp(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path).await {
            warn!("failed to remove temp file {}: {}", path.display(), err);
        }
    }

    /// The full pipeline: reserve capacity, record a Pending row, classify,
    /// upload remotely, and confirm the public URL.
    ///
    /// The ledger debit and the image insert commit as one transaction. A
    /// failure after that commit (classification or upload) leaves the row
    /// Pending with its space held; deleting the row later re-credits it.
    pub async fn process_and_save(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> ServiceResult<ProcessedImage> {
        Self::ensure_supported_mime(content_type)?;
        Self::ensure_file_name_safe(file_name)?;
        if data.is_empty() {
            return Err(ServiceError::Validation("image payload is empty".into()));
        }

        let (tmp_path, size_bytes) = self.spool_upload(&data).await?;
        let required_mb = bytes_to_mb(size_bytes);

        // Debit and Pending row commit together.
        let placement = async {
            let mut tx = self.db.begin().await?;
            let bucket = BucketLedger::reserve_with(&mut tx, required_mb).await?;
            let image = sqlx::query_as::<_, Image>(
                "INSERT INTO images (bucket_id, file_name, size_bytes, url, created_at)
                 VALUES (?, ?, ?, '', ?)
                 RETURNING id, bucket_id, file_name, size_bytes, url, created_at",
            )
            .bind(bucket.id)
            .bind(file_name)
            .bind(size_bytes)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok::<_, ServiceError>((bucket, image))
        }
        .await;

        let (bucket, mut image) = match placement {
            Ok(placed) => placed,
            Err(err) => {
                self.cleanup_temp(&tmp_path).await;
                return Err(err);
            }
        };

        let outcome = self
            .classify_and_upload(&bucket, &mut image, content_type, data)
            .await;
        self.cleanup_temp(&tmp_path).await;

        let (labels, storage) = match outcome {
            Ok(done) => done,
            Err(err) => {
                warn!(
                    image_id = image.id,
                    bucket = %bucket.name,
                    "pipeline failed after placement; row left pending: {err}"
                );
                return Err(err);
            }
        };

        info!(
            image_id = image.id,
            bucket = %bucket.name,
            size_bytes,
            labels = labels.len(),
            "image processed"
        );

        Ok(ProcessedImage {
            image,
            labels,
            bucket,
            storage,
        })
    }

    async fn classify_and_upload(
        &self,
        bucket: &Bucket,
        image: &mut Image,
        content_type: Option<&str>,
        data: Bytes,
    ) -> ServiceResult<(Vec<Label>, StoredUpload)> {
        let detected = self.detector.detect_labels(&data).await?;

        let mut labels = Vec::new();
        for candidate in detected {
            if candidate.score < self.min_confidence {
                debug!(
                    label = %candidate.name,
                    score = candidate.score,
                    "dropping low-confidence label"
                );
                continue;
            }
            let label = sqlx::query_as::<_, Label>(
                "INSERT INTO labels (image_id, name, confidence) VALUES (?, ?, ?)
                 RETURNING id, image_id, name, confidence",
            )
            .bind(image.id)
            .bind(&candidate.name)
            .bind(candidate.score)
            .fetch_one(&*self.db)
            .await?;
            labels.push(label);
        }

        let storage = self
            .store
            .upload(&bucket.name, &image.file_name, content_type, data)
            .await?;

        sqlx::query("UPDATE images SET url = ? WHERE id = ?")
            .bind(&storage.public_url)
            .bind(image.id)
            .execute(&*self.db)
            .await?;
        image.url = storage.public_url.clone();

        Ok((labels, storage))
    }

    /// Paginated listing, newest first (descending id), independent of
    /// bucket. `page` is 1-indexed.
    pub async fn list(&self, page: i64, limit: i64) -> ServiceResult<ImagePage> {
        if page < 1 {
            return Err(ServiceError::Validation("page must be at least 1".into()));
        }
        if limit < 1 {
            return Err(ServiceError::Validation("limit must be at least 1".into()));
        }

        let offset = (page - 1) * limit;
        let images = sqlx::query_as::<_, Image>(
            "SELECT id, bucket_id, file_name, size_bytes, url, created_at
             FROM images ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
            .fetch_one(&*self.db)
            .await?;

        Ok(ImagePage {
            images,
            total,
            page,
            limit,
        })
    }

    /// Case-insensitive exact match against label names; each hit comes back
    /// with its bucket and full label set.
    pub async fn find_by_label(&self, tag: &str) -> ServiceResult<Vec<ImageDetail>> {
        if tag.trim().is_empty() {
            return Err(ServiceError::Validation("tag must not be empty".into()));
        }

        let images = sqlx::query_as::<_, Image>(
            "SELECT DISTINCT i.id, i.bucket_id, i.file_name, i.size_bytes, i.url, i.created_at
             FROM images i
             JOIN labels l ON l.image_id = i.id
             WHERE lower(l.name) = lower(?)
             ORDER BY i.id DESC",
        )
        .bind(tag)
        .fetch_all(&*self.db)
        .await?;

        let mut details = Vec::with_capacity(images.len());
        for image in images {
            let bucket = self.ledger.get(image.bucket_id).await?;
            let labels = self.labels_for(image.id).await?;
            details.push(ImageDetail {
                image,
                bucket,
                labels,
            });
        }
        Ok(details)
    }

    async fn labels_for(&self, image_id: i64) -> ServiceResult<Vec<Label>> {
        let labels = sqlx::query_as::<_, Label>(
            "SELECT id, image_id, name, confidence FROM labels WHERE image_id = ? ORDER BY id",
        )
        .bind(image_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(labels)
    }

    /// Delete an image by id and credit its bucket.
    ///
    /// Order matters: the remote object is deleted first so a remote failure
    /// never over-credits the ledger. A remote `NotFound` is tolerated —
    /// Pending rows have no remote counterpart. The credit and the row
    /// removal commit as one transaction; labels cascade.
    pub async fn delete_image(&self, id: i64) -> ServiceResult<Image> {
        let image = sqlx::query_as::<_, Image>(
            "SELECT id, bucket_id, file_name, size_bytes, url, created_at
             FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::ImageNotFound(id))?;

        let bucket = self.ledger.get(image.bucket_id).await?;

        match self.store.delete(&bucket.name, &image.file_name).await {
            Ok(()) => {}
            Err(RemoteError::NotFound) => {
                debug!(image_id = id, "remote object already absent");
            }
            Err(err) => return Err(err.into()),
        }

        let mut tx = self.db.begin().await?;
        BucketLedger::credit_with(&mut tx, image.bucket_id, bytes_to_mb(image.size_bytes)).await?;
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            image_id = id,
            bucket = %bucket.name,
            credited_mb = bytes_to_mb(image.size_bytes),
            "image deleted"
        );
        Ok(image)
    }

    /// Raw upload: push to the most-available bucket without classification,
    /// ledger debit, or a local row.
    pub async fn raw_upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> ServiceResult<StoredUpload> {
        Self::ensure_supported_mime(content_type)?;
        Self::ensure_file_name_safe(file_name)?;

        let bucket = self
            .ledger
            .most_available()
            .await?
            .ok_or(ServiceError::NoBucketAvailable)?;

        let stored = self
            .store
            .upload(&bucket.name, file_name, content_type, data)
            .await?;
        Ok(stored)
    }

    /// Raw delete against the most-available bucket.
    pub async fn raw_delete(&self, file_name: &str) -> ServiceResult<()> {
        Self::ensure_file_name_safe(file_name)?;

        let bucket = self
            .ledger
            .most_available()
            .await?
            .ok_or(ServiceError::NoBucketAvailable)?;

        match self.store.delete(&bucket.name, file_name).await {
            Ok(()) => Ok(()),
            Err(RemoteError::NotFound) => {
                Err(ServiceError::RemoteObjectNotFound(file_name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Provision a bucket remotely, then register it in the ledger at the
    /// fixed starting capacity.
    ///
    /// A ledger failure after remote success leaves an orphan remote bucket;
    /// that gap is logged, not repaired.
    pub async fn create_bucket(&self, name: &str) -> ServiceResult<Bucket> {
        BucketLedger::ensure_bucket_name_safe(name)?;

        self.store.create_bucket(name).await?;

        match self.ledger.create(name, DEFAULT_BUCKET_CAPACITY_MB).await {
            Ok(bucket) => {
                info!(bucket = %bucket.name, "bucket provisioned and registered");
                Ok(bucket)
            }
            Err(err) => {
                warn!(
                    bucket = name,
                    "remote bucket created but ledger insert failed; orphan remains: {err}"
                );
                Err(err)
            }
        }
    }

    /// The most-available bucket, for inspection.
    pub async fn max_space(&self) -> ServiceResult<Option<Bucket>> {
        self.ledger.most_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{RemoteResult, vision::DetectedLabel};
    use crate::services::testutil::test_pool;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubDetector {
        labels: Vec<DetectedLabel>,
    }

    #[async_trait]
    impl LabelDetector for StubDetector {
        async fn detect_labels(&self, _image: &[u8]) -> RemoteResult<Vec<DetectedLabel>> {
            Ok(self.labels.clone())
        }
    }

    #[derive(Default)]
    struct StubStore {
        fail_uploads: bool,
        fail_deletes: bool,
        objects_missing: bool,
        deletes: Mutex<Vec<(String, String)>>,
        created_buckets: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RemoteStore for StubStore {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            _content_type: Option<&str>,
            _body: Bytes,
        ) -> RemoteResult<StoredUpload> {
            if self.fail_uploads {
                return Err(RemoteError::UnexpectedStatus {
                    status: 503,
                    body: "store down".into(),
                });
            }
            Ok(StoredUpload {
                key: key.to_string(),
                public_url: format!("http://store.test/{bucket}/{key}"),
            })
        }

        async fn delete(&self, bucket: &str, key: &str) -> RemoteResult<()> {
            if self.fail_deletes {
                return Err(RemoteError::UnexpectedStatus {
                    status: 500,
                    body: "boom".into(),
                });
            }
            if self.objects_missing {
                return Err(RemoteError::NotFound);
            }
            self.deletes
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string()));
            Ok(())
        }

        async fn create_bucket(&self, name: &str) -> RemoteResult<()> {
            if self.fail_uploads {
                return Err(RemoteError::UnexpectedStatus {
                    status: 500,
                    body: "provisioning failed".into(),
                });
            }
            self.created_buckets.lock().unwrap().push(name.to_string());
            Ok(())
        }
    }

    fn cat_labels() -> Vec<DetectedLabel> {
        vec![
            DetectedLabel {
                name: "Cat".into(),
                score: 0.98,
            },
            DetectedLabel {
                name: "Fuzzy".into(),
                score: 0.42,
            },
        ]
    }

    async fn service_with(detector: StubDetector, store: StubStore) -> ImageService {
        ImageService::new(
            test_pool().await,
            Arc::new(detector),
            Arc::new(store),
            0.7,
            std::env::temp_dir().join("image-store-tests"),
        )
    }

    async fn service() -> ImageService {
        service_with(
            StubDetector {
                labels: cat_labels(),
            },
            StubStore::default(),
        )
        .await
    }

    fn payload(size: usize) -> Bytes {
        Bytes::from(vec![0u8; size])
    }

    const MB: usize = 1024 * 1024;

    #[tokio::test]
    async fn pipeline_records_stored_image_with_filtered_labels() {
        let service = service().await;
        let bucket = service.ledger.create("b1", 100.0).await.unwrap();

        let result = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(2 * MB))
            .await
            .unwrap();

        assert_eq!(result.bucket.id, bucket.id);
        assert_eq!(result.bucket.free_space_mb, 98.0);
        assert_eq!(result.image.size_bytes, (2 * MB) as i64);
        assert_eq!(result.image.url, "http://store.test/b1/cat.jpg");

        // only the label above the 0.7 confidence floor survives
        assert_eq!(result.labels.len(), 1);
        assert_eq!(result.labels[0].name, "Cat");

        let stored = service.ledger.get(bucket.id).await.unwrap();
        assert_eq!(stored.free_space_mb, 98.0);
    }

    #[tokio::test]
    async fn pipeline_rejects_unsupported_mime() {
        let service = service().await;
        service.ledger.create("b1", 100.0).await.unwrap();

        let err = service
            .process_and_save("notes.txt", Some("text/plain"), payload(10))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn pipeline_without_buckets_reports_no_bucket() {
        let service = service().await;
        let err = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(10))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoBucketAvailable));
    }

    #[tokio::test]
    async fn upload_failure_leaves_pending_row_with_space_held() {
        let service = service_with(
            StubDetector {
                labels: cat_labels(),
            },
            StubStore {
                fail_uploads: true,
                ..StubStore::default()
            },
        )
        .await;
        let bucket = service.ledger.create("b1", 100.0).await.unwrap();

        let err = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(MB))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Remote(_)));

        // row exists, still Pending, and the debit is held
        let page = service.list(1, 50).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.images[0].url, "");
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 99.0);
    }

    #[tokio::test]
    async fn delete_credits_bucket_exactly_once() {
        let service = service().await;
        let bucket = service.ledger.create("b1", 100.0).await.unwrap();

        let processed = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(3 * MB))
            .await
            .unwrap();
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 97.0);

        let deleted = service.delete_image(processed.image.id).await.unwrap();
        assert_eq!(deleted.id, processed.image.id);
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 100.0);

        // second delete is a 404, not another credit
        let err = service.delete_image(processed.image.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::ImageNotFound(_)));
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 100.0);
    }

    #[tokio::test]
    async fn delete_cascades_labels() {
        let service = service().await;
        service.ledger.create("b1", 100.0).await.unwrap();

        let processed = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(MB))
            .await
            .unwrap();
        service.delete_image(processed.image.id).await.unwrap();

        let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM labels")
            .fetch_one(&*service.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn remote_delete_failure_never_credits() {
        let service = service_with(
            StubDetector {
                labels: cat_labels(),
            },
            StubStore {
                fail_deletes: true,
                ..StubStore::default()
            },
        )
        .await;
        let bucket = service.ledger.create("b1", 100.0).await.unwrap();

        let processed = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(MB))
            .await
            .unwrap();

        let err = service.delete_image(processed.image.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Remote(_)));

        // neither credited nor removed
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 99.0);
        assert_eq!(service.list(1, 50).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn delete_tolerates_missing_remote_object() {
        let service = service_with(
            StubDetector {
                labels: cat_labels(),
            },
            StubStore {
                objects_missing: true,
                ..StubStore::default()
            },
        )
        .await;
        let bucket = service.ledger.create("b1", 100.0).await.unwrap();

        let processed = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(MB))
            .await
            .unwrap();

        service.delete_image(processed.image.id).await.unwrap();
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 100.0);
        assert_eq!(service.list(1, 50).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn pagination_is_newest_first() {
        let service = service().await;
        service.ledger.create("b1", 1000.0).await.unwrap();

        let mut ids = Vec::new();
        for n in 1..=5 {
            let processed = service
                .process_and_save(&format!("img{n}.jpg"), Some("image/jpeg"), payload(MB))
                .await
                .unwrap();
            ids.push(processed.image.id);
        }

        // page 2 of size 2 holds the 3rd and 4th newest
        let page = service.list(2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(
            page.images.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![ids[2], ids[1]]
        );
    }

    #[tokio::test]
    async fn list_rejects_zero_page() {
        let service = service().await;
        assert!(matches!(
            service.list(0, 50).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn label_filter_is_case_insensitive() {
        let service = service().await;
        service.ledger.create("b1", 100.0).await.unwrap();

        let processed = service
            .process_and_save("cat.jpg", Some("image/jpeg"), payload(MB))
            .await
            .unwrap();

        let hits = service.find_by_label("cat").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].image.id, processed.image.id);
        assert_eq!(hits[0].bucket.name, "b1");
        assert_eq!(hits[0].labels.len(), 1);

        assert!(service.find_by_label("dog").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn raw_upload_never_debits_the_ledger() {
        let service = service().await;
        let bucket = service.ledger.create("b1", 100.0).await.unwrap();

        let stored = service
            .raw_upload("raw.png", Some("image/png"), payload(MB))
            .await
            .unwrap();
        assert_eq!(stored.public_url, "http://store.test/b1/raw.png");
        assert_eq!(service.ledger.get(bucket.id).await.unwrap().free_space_mb, 100.0);
        assert_eq!(service.list(1, 50).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn raw_delete_missing_object_is_not_found() {
        let service = service_with(
            StubDetector { labels: vec![] },
            StubStore {
                objects_missing: true,
                ..StubStore::default()
            },
        )
        .await;
        service.ledger.create("b1", 100.0).await.unwrap();

        let err = service.raw_delete("ghost.jpg").await.unwrap_err();
        assert!(matches!(err, ServiceError::RemoteObjectNotFound(name) if name == "ghost.jpg"));
    }

    #[tokio::test]
    async fn raw_delete_rejects_suspicious_names() {
        let service = service().await;
        service.ledger.create("b1", 100.0).await.unwrap();

        let err = service.raw_delete("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn create_bucket_provisions_remote_then_registers() {
        let store = StubStore::default();
        let service = service_with(StubDetector { labels: vec![] }, store).await;

        let bucket = service.create_bucket("b1").await.unwrap();
        assert_eq!(bucket.name, "b1");
        assert_eq!(bucket.free_space_mb, DEFAULT_BUCKET_CAPACITY_MB);

        let best = service.max_space().await.unwrap().unwrap();
        assert_eq!(best.name, "b1");
        assert_eq!(best.free_space_mb, 100.0);
    }

    #[tokio::test]
    async fn create_bucket_remote_failure_registers_nothing() {
        let service = service_with(
            StubDetector { labels: vec![] },
            StubStore {
                fail_uploads: true,
                ..StubStore::default()
            },
        )
        .await;

        let err = service.create_bucket("b1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Remote(_)));
        assert!(service.max_space().await.unwrap().is_none());
    }
}
