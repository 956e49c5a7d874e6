//! Static classifier for offline scoring and tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::{ClassifierBackend, ClassifierError, ClassifyingGuard};

/// Returns a fixed outcome for every attempt
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    outcome: Result<f64, ClassifierError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    classifying: Arc<AtomicBool>,
}

impl StaticClassifier {
    /// Always answer with `confidence`
    pub fn confident(confidence: f64) -> Self {
        Self::with_outcome(Ok(confidence))
    }

    /// Always fail with `error`
    pub fn failing(error: ClassifierError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<f64, ClassifierError>) -> Self {
        Self {
            outcome,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            classifying: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of classify calls so far, shared between clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClassifierBackend for StaticClassifier {
    async fn classify(&mut self, _image: &image::RgbaImage) -> Result<f64, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let _guard = ClassifyingGuard::start(&self.classifying);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }

        let confidence = self.outcome.clone()?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ClassifierError::InvalidResponse(format!(
                "confidence {confidence} out of range"
            )));
        }
        Ok(confidence)
    }

    fn cancel(&mut self) {
        self.classifying.store(false, Ordering::SeqCst);
    }

    fn is_classifying(&self) -> bool {
        self.classifying.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt() -> image::RgbaImage {
        image::RgbaImage::new(2, 2)
    }

    #[tokio::test]
    async fn test_confident_counts_calls() {
        let mut classifier = StaticClassifier::confident(0.6);
        let handle = classifier.clone();
        assert_eq!(classifier.classify(&attempt()).await, Ok(0.6));
        assert_eq!(classifier.classify(&attempt()).await, Ok(0.6));
        assert_eq!(handle.calls(), 2);
        assert!(!classifier.is_classifying());
    }

    #[tokio::test]
    async fn test_timed_out_classify_clears_flag() {
        let mut classifier = StaticClassifier::confident(0.6).with_delay(Duration::from_secs(5));
        let attempt = attempt();

        let outcome =
            tokio::time::timeout(Duration::from_millis(20), classifier.classify(&attempt)).await;
        assert!(outcome.is_err());
        assert!(!classifier.is_classifying());
        assert_eq!(classifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing() {
        let mut classifier =
            StaticClassifier::failing(ClassifierError::Connection("offline".into()));
        assert_eq!(
            classifier.classify(&attempt()).await,
            Err(ClassifierError::Connection("offline".into()))
        );
    }

    #[tokio::test]
    async fn test_out_of_range_confidence() {
        let mut classifier = StaticClassifier::confident(1.2);
        assert!(matches!(
            classifier.classify(&attempt()).await,
            Err(ClassifierError::InvalidResponse(_))
        ));
    }
}
