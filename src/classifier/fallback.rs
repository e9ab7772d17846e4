//! Fallback classification.
//!
//! When the remote classifier cannot answer, a plausible result is
//! synthesised locally: a uniformly random category and a confidence drawn
//! from `[0.70, 1.00]`, rounded to two decimals, after an artificial delay
//! that mimics analysis latency.

use super::traits::{ClassificationResult, Classifier};
use crate::error::{ClassifyError, ClassifyResult};
use crate::types::{Category, ImageHandle, Source};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Lower bound of synthesised confidence.
pub const MIN_CONFIDENCE: f64 = 0.70;
/// Upper bound of synthesised confidence.
pub const MAX_CONFIDENCE: f64 = 1.00;

const DETAILS: &str = "Mock classification result";

/// Random classifier used as the fallback path.
///
/// The random source is injectable so results are reproducible in tests.
pub struct MockClassifier {
    rng: Mutex<Box<dyn RngCore + Send>>,
    delay: Duration,
}

impl MockClassifier {
    /// Default artificial latency.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a generator drawing from `rng`.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            delay: Self::DEFAULT_DELAY,
        }
    }

    /// Set the artificial delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Configured artificial delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Draw a result without waiting.
    pub fn generate(&self) -> ClassifyResult<ClassificationResult> {
        let mut guard = self
            .rng
            .lock()
            .map_err(|_| ClassifyError::Unavailable("fallback generator poisoned".to_string()))?;
        let rng = &mut **guard;

        let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];
        let confidence = round2(rng.gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE));

        Ok(ClassificationResult::new(category, confidence, Source::Fallback)
            .with_details(Some(DETAILS.to_string())))
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn classify(&self, _image: &ImageHandle) -> ClassifyResult<ClassificationResult> {
        tokio::time::sleep(self.delay).await;
        self.generate()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_seeded_output_is_reproducible() {
        let a = MockClassifier::with_rng(StdRng::seed_from_u64(42));
        let b = MockClassifier::with_rng(StdRng::seed_from_u64(42));

        for _ in 0..10 {
            assert_eq!(a.generate().unwrap(), b.generate().unwrap());
        }
    }

    #[test]
    fn test_seeded_output_matches_draw_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];
        let confidence = round2(rng.gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE));

        let mock = MockClassifier::with_rng(StdRng::seed_from_u64(7));
        let result = mock.generate().unwrap();

        assert_eq!(result.category, category);
        assert_eq!(result.confidence, confidence);
        assert_eq!(result.source, Source::Fallback);
        assert_eq!(result.details.as_deref(), Some(DETAILS));
    }

    #[test]
    fn test_output_within_bounds() {
        let mock = MockClassifier::with_rng(StdRng::seed_from_u64(1));
        let mut seen = std::collections::HashSet::new();

        for _ in 0..500 {
            let result = mock.generate().unwrap();
            assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&result.confidence));
            assert_eq!(result.confidence, round2(result.confidence));
            seen.insert(result.category);
        }

        assert_eq!(seen.len(), Category::ALL.len());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.876), 0.88);
        assert_eq!(round2(0.7), 0.7);
        assert_eq!(round2(0.999), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_classify_waits_for_delay() {
        let mock = MockClassifier::with_rng(StdRng::seed_from_u64(3));
        let start = tokio::time::Instant::now();

        let result = mock.classify(&ImageHandle::new("any.jpg")).await.unwrap();

        assert!(start.elapsed() >= MockClassifier::DEFAULT_DELAY);
        assert_eq!(result.source, Source::Fallback);
    }

    #[test]
    fn test_delay_defaults_and_overrides() {
        let mock = MockClassifier::with_rng(StdRng::seed_from_u64(3));
        assert_eq!(mock.delay(), MockClassifier::DEFAULT_DELAY);

        let mock = mock.with_delay(Duration::from_millis(250));
        assert_eq!(mock.delay(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_zero_delay() {
        let mock = MockClassifier::with_rng(StdRng::seed_from_u64(3)).with_delay(Duration::ZERO);
        let start = Instant::now();
        mock.classify(&ImageHandle::new("any.jpg")).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
