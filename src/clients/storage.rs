//! Client for the remote object-storage service.
//!
//! The service exposes an S3-like surface: `PUT /{bucket}/{key}` uploads,
//! `DELETE /{bucket}/{key}` removes, and `PUT /{bucket}` provisions a bucket.

use crate::clients::{RemoteError, RemoteResult, unexpected_status};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, header};
use serde::Serialize;
use tracing::debug;

/// Outcome of a confirmed upload.
#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    pub key: String,
    pub public_url: String,
}

/// Narrow interface over the object-storage collaborator.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> RemoteResult<StoredUpload>;

    /// Removes an object; `RemoteError::NotFound` when the key is absent.
    async fn delete(&self, bucket: &str, key: &str) -> RemoteResult<()>;

    async fn create_bucket(&self, name: &str) -> RemoteResult<()>;
}

/// HTTP implementation against a single storage endpoint.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, bucket, key)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> RemoteResult<StoredUpload> {
        let url = self.object_url(bucket, key);
        debug!("uploading {} bytes to {}", body.len(), url);

        let mut request = self.client.put(&url).body(body);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }

        Ok(StoredUpload {
            key: key.to_string(),
            public_url: url,
        })
    }

    async fn delete(&self, bucket: &str, key: &str) -> RemoteResult<()> {
        let url = self.object_url(bucket, key);
        let response = self.client.delete(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound),
            _ => Err(unexpected_status(response).await),
        }
    }

    async fn create_bucket(&self, name: &str) -> RemoteResult<()> {
        let url = format!("{}/{}", self.base_url, name);
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }
}
