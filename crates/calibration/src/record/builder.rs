//! Builder that fuses an analysis into a calibration result.

use crate::score::{Confidence, ScoreError};
use crate::validation::QuestionnaireError;

use super::{CalibrationResult, Questionnaire};

/// Error type for building calibration results.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    #[error("No classifier confidence supplied")]
    MissingConfidence,
    #[error("Scoring unavailable: {0}")]
    ScoringUnavailable(String),
    #[error("Invalid radial error: {0}")]
    InvalidRadialError(f64),
    #[error("Invalid questionnaire: {0}")]
    InvalidQuestionnaire(#[from] QuestionnaireError),
}

/// Assembles a [`CalibrationResult`] from an analysis
///
/// # Example
///
/// ```ignore
/// let result = ResultBuilder::new(radial_error)
///     .confidence(Confidence::present(0.93)?)
///     .questionnaire(answers)
///     .build()?;
/// store.store(&result).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ResultBuilder {
    radial_error: f64,
    confidence: Option<Confidence>,
    questionnaire: Option<Questionnaire>,
    timestamp_ms: Option<u64>,
}

impl ResultBuilder {
    pub fn new(radial_error: f64) -> Self {
        Self {
            radial_error,
            confidence: None,
            questionnaire: None,
            timestamp_ms: None,
        }
    }

    pub fn confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn questionnaire(mut self, questionnaire: Questionnaire) -> Self {
        self.questionnaire = Some(questionnaire);
        self
    }

    /// Override the timestamp (defaults to now)
    pub fn timestamp_ms(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Fuse the score and produce the immutable record
    pub fn build(self) -> Result<CalibrationResult, RecordError> {
        if !(self.radial_error >= 0.0) {
            return Err(RecordError::InvalidRadialError(self.radial_error));
        }

        let confidence = self.confidence.ok_or(RecordError::MissingConfidence)?;
        let fused = confidence.fuse(self.radial_error).map_err(|e| match e {
            ScoreError::Unavailable(reason) => RecordError::ScoringUnavailable(reason),
            ScoreError::ConfidenceOutOfRange(value) => {
                RecordError::ScoringUnavailable(format!("confidence {value} out of range"))
            }
        })?;
        let classifier_confidence = confidence.value().unwrap_or_default();

        if let Some(answers) = &self.questionnaire {
            answers.validate()?;
        }

        Ok(CalibrationResult {
            radial_error: self.radial_error,
            classifier_confidence,
            final_score: fused.score,
            feedback: fused.feedback,
            feedback_message: fused.feedback.message(),
            timestamp_ms: self.timestamp_ms.unwrap_or_else(now_ms),
            questionnaire: self.questionnaire,
        })
    }
}

/// Milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
