//! Fusion of radial deviation and classifier confidence
//!
//! `raw = 100 · 2^(5c − 5) − 100 · e`, clamped to [0, 100] and rounded.
//! The exponential term makes the classifier dominate near the top of the
//! scale (c = 1 gives 100, c = 0.8 gives 50, c = 0.5 gives about 18); the
//! deviation is a linear penalty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{EXCELLENT_THRESHOLD, GOOD_THRESHOLD, MAX_SCORE, MODERATE_THRESHOLD};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Classifier confidence out of range: {0} (expected 0..=1)")]
    ConfidenceOutOfRange(f64),
    #[error("Scoring unavailable: {0}")]
    Unavailable(String),
}

/// Classifier confidence known to lie in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ClassifierConfidence(f64);

impl ClassifierConfidence {
    pub fn new(value: f64) -> Result<Self, ScoreError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreError::ConfidenceOutOfRange(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ClassifierConfidence {
    type Error = ScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClassifierConfidence> for f64 {
    fn from(confidence: ClassifierConfidence) -> Self {
        confidence.0
    }
}

/// Outcome of asking the classifier
///
/// Callers must branch on this before fusing; an unavailable confidence is
/// never turned into a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Confidence {
    Present(ClassifierConfidence),
    Unavailable { reason: String },
}

impl Confidence {
    /// Wrap a raw classifier value, rejecting anything outside [0, 1]
    pub fn present(value: f64) -> Result<Self, ScoreError> {
        ClassifierConfidence::new(value).map(Self::Present)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Present(confidence) => Some(confidence.value()),
            Self::Unavailable { .. } => None,
        }
    }

    /// Fuse with a radial error, failing if the confidence is unavailable
    pub fn fuse(&self, radial_error: f64) -> Result<FusedScore, ScoreError> {
        match self {
            Self::Present(confidence) => Ok(fuse(*confidence, radial_error)),
            Self::Unavailable { reason } => Err(ScoreError::Unavailable(reason.clone())),
        }
    }
}

/// Qualitative bucket for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feedback {
    NeedsPractice,
    Moderate,
    Good,
    Excellent,
}

impl Feedback {
    /// Bucket any 0..=100 score; every score shown to a user goes through here
    pub fn from_score(score: u8) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if score >= GOOD_THRESHOLD {
            Self::Good
        } else if score >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::NeedsPractice
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::NeedsPractice => "Needs practice",
        }
    }

    /// User-facing explanation
    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent control! Your tracing is very accurate.",
            Self::Good => "Good control. Minor deviations from the template.",
            Self::Moderate => "Moderate control. Some noticeable deviations from the template.",
            Self::NeedsPractice => {
                "Keep practicing. There are significant deviations from the template."
            }
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Final score and its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusedScore {
    pub score: u8,
    pub feedback: Feedback,
}

impl FusedScore {
    pub fn from_score(score: u8) -> Self {
        Self {
            score,
            feedback: Feedback::from_score(score),
        }
    }
}

/// Unclamped score before rounding
#[inline]
pub fn raw_score(confidence: f64, radial_error: f64) -> f64 {
    MAX_SCORE * (5.0 * confidence - 5.0).exp2() - MAX_SCORE * radial_error
}

/// Combine classifier confidence and radial error into a 0..=100 score
///
/// A non-finite error counts as maximal deviation.
pub fn fuse(confidence: ClassifierConfidence, radial_error: f64) -> FusedScore {
    let raw = raw_score(confidence.value(), radial_error);
    let score = if raw.is_nan() {
        0
    } else {
        raw.clamp(0.0, MAX_SCORE).round() as u8
    };
    FusedScore::from_score(score)
}
