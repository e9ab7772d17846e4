//! Classifier trait abstraction.
//!
//! Defines a common interface for anything that can turn an image into a
//! waste category, so the remote endpoint and the fallback generator can be
//! used interchangeably and replaced in tests.

use crate::error::ClassifyResult;
use crate::types::{Category, ImageHandle, Source};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Outcome of classifying one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Detected category.
    pub category: Category,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Whether the endpoint or the fallback generator produced this result.
    pub source: Source,
    /// Free-form detail supplied by the producer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ClassificationResult {
    /// Create a new result.
    pub fn new(category: Category, confidence: f64, source: Source) -> Self {
        Self {
            category,
            confidence,
            source,
            details: None,
        }
    }

    /// Set the details.
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    /// Confidence as a percentage.
    pub fn percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.1}% confidence, {})",
            self.category,
            self.percent(),
            self.source
        )
    }
}

/// Trait for classifier implementations.
///
/// # Example
///
/// ```ignore
/// use smartbin::classifier::{Classifier, ClassificationResult};
/// use smartbin::types::ImageHandle;
///
/// async fn classify<C: Classifier>(classifier: &C, image: &ImageHandle) {
///     let result = classifier.classify(image).await?;
///     println!("{}", result);
/// }
/// ```
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Classify the image behind `image`.
    async fn classify(&self, image: &ImageHandle) -> ClassifyResult<ClassificationResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_display() {
        let result = ClassificationResult::new(Category::Paper, 0.853, Source::Remote);
        assert_eq!(result.to_string(), "Paper (85.3% confidence, remote)");
    }

    #[test]
    fn test_result_serialization() {
        let result = ClassificationResult::new(Category::Organic, 0.9, Source::Fallback)
            .with_details(Some("Mock classification result".to_string()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "Organic");
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["details"], "Mock classification result");
    }
}
