//! Remote classification endpoint.
//!
//! Uploads the image as multipart field `image` to `POST {base}/classify`
//! and normalizes the JSON answer. Missing `type` or `confidence` fields are
//! filled with defaults; anything else unexpected is reported as malformed
//! so the caller can fall back.

use super::traits::{ClassificationResult, Classifier};
use crate::error::{ClassifyError, ClassifyResult};
use crate::types::{Category, ImageHandle, Source};
use async_trait::async_trait;
use reqwest::{header, multipart, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Category assumed when the endpoint omits `type`.
pub const DEFAULT_CATEGORY: Category = Category::Plastic;
/// Confidence assumed when the endpoint omits `confidence`.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Wire shape of a classification answer. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ClassifyResponse {
    #[serde(rename = "type")]
    kind: Option<String>,
    confidence: Option<f64>,
    details: Option<String>,
}

/// HTTP classifier.
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
}

impl RemoteClassifier {
    /// Create a classifier for the service rooted at `base_url`.
    ///
    /// `timeout` bounds each request at the transport level.
    pub fn new(base_url: &str, timeout: Duration) -> ClassifyResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a classifier that reuses an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/classify", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(&self, image: &ImageHandle) -> ClassifyResult<ClassificationResult> {
        let bytes = tokio::fs::read(image.path()).await?;
        let part = multipart::Part::bytes(bytes)
            .file_name(image.file_name())
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("image", part);

        debug!(endpoint = %self.endpoint, image = %image, "sending classification request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let payload: ClassifyResponse =
            serde_json::from_slice(&body).map_err(|e| ClassifyError::Malformed(e.to_string()))?;

        normalize(payload)
    }
}

/// Turn a wire answer into a result, applying the documented defaults.
fn normalize(payload: ClassifyResponse) -> ClassifyResult<ClassificationResult> {
    let category = match payload.kind.as_deref() {
        None => DEFAULT_CATEGORY,
        Some(kind) => kind
            .parse()
            .map_err(|e| ClassifyError::Malformed(format!("{}", e)))?,
    };

    let confidence = payload.confidence.unwrap_or(DEFAULT_CONFIDENCE);
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ClassifyError::Malformed(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }

    Ok(ClassificationResult::new(category, confidence, Source::Remote).with_details(payload.details))
}
