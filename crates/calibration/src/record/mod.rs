//! Calibration result records and their in-memory log.
//!
//! This module provides:
//! - [`CalibrationResult`] - The immutable outcome of one analysed attempt
//! - [`ResultBuilder`] - Fuses deviation and confidence into a result
//! - [`Questionnaire`] - Optional self-reported context
//! - [`ResultLog`] - Thread-safe append-only result storage with listeners
//!
//! ## Serialized form
//!
//! Results serialize to the flat camelCase document the analytics store
//! expects:
//!
//! ```text
//! { "radialError": 0.031, "confidence": 0.93, "score": 86, "feedback": "Good",
//!   "feedbackMessage": "Good control. Minor deviations from the template.",
//!   "timestamp": 1760000000000, "medicineTaken": true, "exercised": false,
//!   "hoursOfSleep": 7.5, "mood": 4 }
//! ```
//!
//! The questionnaire fields are omitted when no answers were given.

mod builder;
mod events;
mod questionnaire;
mod storage;

use serde::Serialize;

use crate::score::Feedback;

pub use builder::{RecordError, ResultBuilder, now_ms};
pub use events::RecordEvent;
pub use questionnaire::{MAX_MOOD, MAX_SLEEP_HOURS, MIN_MOOD, MIN_SLEEP_HOURS, Questionnaire};
pub use storage::{RESULT_COLLECTION, ResultLog};

/// Outcome of one analysed attempt
///
/// Built only through [`ResultBuilder`], and only from a present classifier
/// confidence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    radial_error: f64,
    #[serde(rename = "confidence")]
    classifier_confidence: f64,
    #[serde(rename = "score")]
    final_score: u8,
    feedback: Feedback,
    /// User-facing sentence for `feedback`, as shown with the score
    feedback_message: &'static str,
    #[serde(rename = "timestamp")]
    timestamp_ms: u64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    questionnaire: Option<Questionnaire>,
}

impl CalibrationResult {
    pub fn radial_error(&self) -> f64 {
        self.radial_error
    }

    pub fn classifier_confidence(&self) -> f64 {
        self.classifier_confidence
    }

    pub fn final_score(&self) -> u8 {
        self.final_score
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn feedback_message(&self) -> &'static str {
        self.feedback_message
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn questionnaire(&self) -> Option<&Questionnaire> {
        self.questionnaire.as_ref()
    }

    /// A copy of this result with questionnaire answers attached
    pub fn with_questionnaire(&self, answers: Questionnaire) -> Result<Self, RecordError> {
        answers.validate()?;
        Ok(Self {
            questionnaire: Some(answers),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Confidence;
    use crate::validation::QuestionnaireError;

    fn result(confidence: f64, radial_error: f64) -> CalibrationResult {
        ResultBuilder::new(radial_error)
            .confidence(Confidence::present(confidence).unwrap())
            .timestamp_ms(1_000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_fuses_score() {
        let result = result(1.0, 0.0);
        assert_eq!(result.final_score(), 100);
        assert_eq!(result.feedback(), Feedback::Excellent);
        assert_eq!(result.feedback_message(), Feedback::Excellent.message());
        assert_eq!(result.classifier_confidence(), 1.0);
        assert_eq!(result.timestamp_ms(), 1_000);
        assert!(result.questionnaire().is_none());

        let result = self::result(0.8, 0.0);
        assert_eq!(result.final_score(), 50);
        assert_eq!(result.feedback(), Feedback::NeedsPractice);
    }

    #[test]
    fn test_builder_rejects_unavailable_confidence() {
        let err = ResultBuilder::new(0.1)
            .confidence(Confidence::unavailable("connection refused"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::ScoringUnavailable("connection refused".to_string())
        );

        let err = ResultBuilder::new(0.1).build().unwrap_err();
        assert_eq!(err, RecordError::MissingConfidence);
    }

    #[test]
    fn test_builder_rejects_bad_inputs() {
        let confidence = Confidence::present(0.9).unwrap();
        let err = ResultBuilder::new(f64::NAN)
            .confidence(confidence.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidRadialError(_)));

        let err = ResultBuilder::new(0.0)
            .confidence(confidence)
            .questionnaire(Questionnaire {
                mood: 9,
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidQuestionnaire(QuestionnaireError::Mood(9))
        );
    }

    #[test]
    fn test_default_timestamp_is_now() {
        let before = now_ms();
        let result = ResultBuilder::new(0.0)
            .confidence(Confidence::present(0.5).unwrap())
            .build()
            .unwrap();
        assert!(result.timestamp_ms() >= before);
    }

    #[test]
    fn test_with_questionnaire_keeps_original() {
        let original = result(0.95, 0.02);
        let answers = Questionnaire {
            medicine_taken: true,
            hours_of_sleep: 6.5,
            mood: 4,
            ..Default::default()
        };
        let answered = original.with_questionnaire(answers).unwrap();
        assert!(original.questionnaire().is_none());
        assert_eq!(answered.questionnaire(), Some(&answers));
        assert_eq!(answered.final_score(), original.final_score());
    }

    #[test]
    fn test_serialized_field_names() {
        let result = result(0.8, 0.0)
            .with_questionnaire(Questionnaire::default())
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score"], 50);
        assert_eq!(json["confidence"], 0.8);
        assert_eq!(json["radialError"], 0.0);
        assert_eq!(json["feedback"], "NeedsPractice");
        assert_eq!(
            json["feedbackMessage"],
            "Keep practicing. There are significant deviations from the template."
        );
        assert_eq!(json["timestamp"], 1_000);
        assert_eq!(json["medicineTaken"], false);
        assert_eq!(json["hoursOfSleep"], 8.0);
        assert_eq!(json["mood"], 3);

        let bare = serde_json::to_value(self::result(0.8, 0.0)).unwrap();
        assert!(bare.get("mood").is_none());
    }

    #[test]
    fn test_result_log_append_and_query() {
        let log = ResultLog::new();
        assert!(log.is_empty());

        let first = log.append(result(1.0, 0.0));
        let second = log.append(result(0.8, 0.0));
        assert_eq!(first, "calibrationStats/0");
        assert_eq!(second, "calibrationStats/1");
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&first).unwrap().final_score(), 100);
        assert_eq!(log.latest().unwrap().final_score(), 50);
        assert!(log.get("calibrationStats/99").is_none());

        log.clear();
        assert!(log.is_empty());
        // Keys keep counting after a clear
        assert_eq!(log.append(result(1.0, 0.0)), "calibrationStats/2");
    }

    #[test]
    fn test_result_log_event_listener() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let log = ResultLog::new();
        let stored = Arc::new(AtomicUsize::new(0));
        let stored_clone = Arc::clone(&stored);

        log.add_event_listener(move |event| {
            if let RecordEvent::Stored { .. } = event {
                stored_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        log.append(result(1.0, 0.0));
        log.append(result(0.9, 0.1));
        log.clear();

        assert_eq!(stored.load(Ordering::SeqCst), 2);
    }
}
