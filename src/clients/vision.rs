//! Client for the image-classification (label detection) service.

use crate::clients::{RemoteResult, unexpected_status};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One classification result as returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedLabel {
    pub name: String,
    pub score: f64,
}

/// Narrow interface over the classification collaborator.
///
/// May return an empty sequence; confidence filtering is the caller's
/// concern.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(&self, image: &[u8]) -> RemoteResult<Vec<DetectedLabel>>;
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    labels: Vec<DetectedLabel>,
}

/// HTTP implementation: posts the base64-encoded payload to
/// `{base_url}/labels` and decodes the label list from the JSON response.
#[derive(Clone)]
pub struct HttpLabelDetector {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

impl HttpLabelDetector {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results,
        }
    }
}

#[async_trait]
impl LabelDetector for HttpLabelDetector {
    async fn detect_labels(&self, image: &[u8]) -> RemoteResult<Vec<DetectedLabel>> {
        let encoded = general_purpose::STANDARD.encode(image);
        let url = format!("{}/labels", self.base_url);
        debug!("requesting label detection for {} byte payload", image.len());

        let response = self
            .client
            .post(&url)
            .json(&DetectRequest {
                image: &encoded,
                max_results: self.max_results,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }

        let body: DetectResponse = response.json().await?;
        Ok(body.labels)
    }
}
