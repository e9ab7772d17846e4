//! Classification service - remote first, fallback always.
//!
//! The remote endpoint is an unreliable dependency. [`ClassificationService`]
//! bounds each remote attempt with a timeout and, on any failure, hands the
//! image to the [`MockClassifier`] instead of surfacing the error. Callers
//! therefore always receive a plausible result tagged with its
//! [`Source`](crate::types::Source).

pub mod fallback;
pub mod remote;
pub mod traits;

pub use fallback::MockClassifier;
pub use remote::RemoteClassifier;
pub use traits::{ClassificationResult, Classifier};

use crate::error::{ClassifyError, ClassifyResult};
use crate::types::ImageHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Default bound on one remote attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates a remote attempt with a strict fallback.
pub struct ClassificationService {
    remote: Option<Arc<dyn Classifier>>,
    fallback: MockClassifier,
    timeout: Duration,
}

impl ClassificationService {
    /// Create a service that tries `remote` before falling back.
    pub fn new(remote: Arc<dyn Classifier>, fallback: MockClassifier) -> Self {
        Self {
            remote: Some(remote),
            fallback,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a service with no remote endpoint.
    pub fn offline(fallback: MockClassifier) -> Self {
        Self {
            remote: None,
            fallback,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the remote attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured remote attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify `image`, falling back to a synthesised result on any remote
    /// failure.
    ///
    /// Only fails with [`ClassifyError::Unavailable`] when the fallback
    /// itself cannot run.
    pub async fn classify(&self, image: &ImageHandle) -> ClassifyResult<ClassificationResult> {
        match &self.remote {
            Some(remote) => match self.attempt(remote.as_ref(), image).await {
                Ok(result) => {
                    info!(
                        classifier = remote.name(),
                        category = %result.category,
                        confidence = result.confidence,
                        "image classified"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    warn!(
                        classifier = remote.name(),
                        error = %e,
                        "remote classification failed, using fallback"
                    );
                }
            },
            None => debug!(
                delay = ?self.fallback.delay(),
                "no classifier endpoint configured, using fallback"
            ),
        }

        let result = self.fallback.classify(image).await.map_err(|e| match e {
            ClassifyError::Unavailable(_) => e,
            other => ClassifyError::Unavailable(other.to_string()),
        })?;

        info!(
            category = %result.category,
            confidence = result.confidence,
            source = %result.source,
            "image classified by fallback"
        );
        Ok(result)
    }

    async fn attempt(
        &self,
        remote: &dyn Classifier,
        image: &ImageHandle,
    ) -> ClassifyResult<ClassificationResult> {
        timeout(self.timeout, remote.classify(image))
            .await
            .map_err(|_| ClassifyError::Timeout(self.timeout))?
    }
}
