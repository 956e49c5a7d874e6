//! Self-reported context collected after an attempt.

use serde::{Deserialize, Serialize};

use crate::validation::{QuestionnaireError, is_half_step_in_range};

pub const MIN_SLEEP_HOURS: f32 = 0.0;
pub const MAX_SLEEP_HOURS: f32 = 12.0;
pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 5;

/// Answers attached to a calibration result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Questionnaire {
    pub medicine_taken: bool,
    pub exercised: bool,
    /// 0 to 12 in half-hour steps
    pub hours_of_sleep: f32,
    /// 1 (low) to 5 (high)
    pub mood: u8,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self {
            medicine_taken: false,
            exercised: false,
            hours_of_sleep: 8.0,
            mood: 3,
        }
    }
}

impl Questionnaire {
    pub fn validate(&self) -> Result<(), QuestionnaireError> {
        if !is_half_step_in_range(self.hours_of_sleep, MIN_SLEEP_HOURS, MAX_SLEEP_HOURS) {
            return Err(QuestionnaireError::HoursOfSleep(self.hours_of_sleep));
        }
        if !(MIN_MOOD..=MAX_MOOD).contains(&self.mood) {
            return Err(QuestionnaireError::Mood(self.mood));
        }
        Ok(())
    }
}
