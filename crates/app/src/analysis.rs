//! Attempt analysis: radial deviation, classifier confidence and score fusion
//!
//! Only one analysis runs at a time per [`Analyzer`]. A second request while
//! one is outstanding is rejected rather than queued. Each classifier attempt
//! is bounded by a timeout and failed attempts are retried a fixed number of
//! times before the confidence is reported unavailable.

use std::time::Duration;

use calibration::{
    CalibrationResult, CalibrationSession, ClassifierConfidence, Confidence, FusedScore,
    Questionnaire, RecordError, ResultBuilder, deviation_report,
};
use image::RgbaImage;
use spiralcal_classifier::ClassifierBackend;
use spiralcal_config::ClassifierConfig;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::store::{ResultStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Nothing to analyze: no stroke has been committed")]
    NoAttempt,

    #[error("An analysis is already in progress")]
    Busy,
}

/// Failure to turn an analysis into a stored record
#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The record was built but could not be stored; it is still usable
    #[error("Failed to store calibration result: {source}")]
    Store {
        result: Box<CalibrationResult>,
        source: StoreError,
    },
}

/// Outcome of analysing one attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Scored {
        radial_error: f64,
        confidence: ClassifierConfidence,
        fused: FusedScore,
    },
    /// The classifier gave no usable answer; no score is produced
    Unavailable { radial_error: f64, reason: String },
}

impl Analysis {
    pub fn radial_error(&self) -> f64 {
        match self {
            Analysis::Scored { radial_error, .. } | Analysis::Unavailable { radial_error, .. } => {
                *radial_error
            }
        }
    }

    pub fn fused(&self) -> Option<FusedScore> {
        match self {
            Analysis::Scored { fused, .. } => Some(*fused),
            Analysis::Unavailable { .. } => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Analysis::Scored { .. })
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Analysis::Scored { confidence, .. } => Confidence::Present(*confidence),
            Analysis::Unavailable { reason, .. } => Confidence::unavailable(reason.clone()),
        }
    }

    /// Build the record for this analysis
    ///
    /// Fails with [`RecordError::ScoringUnavailable`] when unscored.
    pub fn to_result(
        &self,
        questionnaire: Option<Questionnaire>,
    ) -> Result<CalibrationResult, RecordError> {
        let mut builder = ResultBuilder::new(self.radial_error()).confidence(self.confidence());
        if let Some(answers) = questionnaire {
            builder = builder.questionnaire(answers);
        }
        builder.build()
    }

    /// Build the record and hand it to `store`
    ///
    /// A storage failure still returns the built record inside
    /// [`SubmitError::Store`] so it can be shown.
    pub async fn submit<S: ResultStore>(
        &self,
        store: &S,
        questionnaire: Option<Questionnaire>,
    ) -> Result<(String, CalibrationResult), SubmitError> {
        let result = self.to_result(questionnaire)?;
        match store.store(&result).await {
            Ok(key) => {
                info!("Stored calibration result {}", key);
                Ok((key, result))
            }
            Err(source) => {
                warn!("Failed to store calibration result: {}", source);
                Err(SubmitError::Store {
                    result: Box::new(result),
                    source,
                })
            }
        }
    }
}

/// Runs analyses against a classifier backend
pub struct Analyzer<B> {
    classifier: Mutex<B>,
    timeout: Duration,
    attempts: u32,
}

impl<B: ClassifierBackend> Analyzer<B> {
    pub fn new(classifier: B, config: &ClassifierConfig) -> Self {
        Self::with_policy(classifier, config.timeout(), config.retries)
    }

    /// `retries` counts attempts after the first one
    pub fn with_policy(classifier: B, timeout: Duration, retries: u32) -> Self {
        Self {
            classifier: Mutex::new(classifier),
            timeout,
            attempts: retries.saturating_add(1),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True while an analysis holds the classifier
    pub fn is_busy(&self) -> bool {
        self.classifier.try_lock().is_err()
    }

    pub fn into_classifier(self) -> B {
        self.classifier.into_inner()
    }

    /// Score the session's current attempt
    pub async fn analyze(&self, session: &CalibrationSession) -> Result<Analysis, AnalysisError> {
        if !session.has_attempt() {
            warn!("Analysis rejected: nothing drawn");
            return Err(AnalysisError::NoAttempt);
        }

        let mut classifier = self.classifier.try_lock().map_err(|_| {
            warn!("Analysis rejected: another analysis is in progress");
            AnalysisError::Busy
        })?;

        let report = deviation_report(&session.scored_strokes(), session.params());
        debug!(
            "Deviation over {} points: mean {:.4}, worst {:.2}px",
            report.point_count, report.normalized_error, report.max_point_error
        );
        let radial_error = report.normalized_error;

        let snapshot = session.visible_snapshot().clone();
        let confidence = self
            .request_confidence(&mut *classifier, snapshot.image())
            .await;

        let analysis = match confidence {
            Confidence::Present(confidence) => {
                let fused = calibration::fuse(confidence, radial_error);
                info!(
                    "Analysis scored {} ({}), confidence {:.3}, radial error {:.4}",
                    fused.score,
                    fused.feedback,
                    confidence.value(),
                    radial_error
                );
                Analysis::Scored {
                    radial_error,
                    confidence,
                    fused,
                }
            }
            Confidence::Unavailable { reason } => {
                info!("Analysis unavailable: {}", reason);
                Analysis::Unavailable {
                    radial_error,
                    reason,
                }
            }
        };
        Ok(analysis)
    }

    async fn request_confidence(&self, classifier: &mut B, image: &RgbaImage) -> Confidence {
        let mut reason = String::from("classifier was not called");

        for attempt in 1..=self.attempts {
            let outcome = tokio::time::timeout(self.timeout, classifier.classify(image)).await;
            match outcome {
                Ok(Ok(value)) => match Confidence::present(value) {
                    Ok(confidence) => return confidence,
                    Err(e) => reason = e.to_string(),
                },
                Ok(Err(e)) => reason = e.to_string(),
                Err(_) => {
                    classifier.cancel();
                    reason = format!("timed out after {} ms", self.timeout.as_millis());
                }
            }
            warn!(
                "Classifier attempt {}/{} failed: {}",
                attempt, self.attempts, reason
            );
        }

        Confidence::unavailable(reason)
    }
}
