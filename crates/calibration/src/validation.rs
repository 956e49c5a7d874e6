use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("Invalid spiral radius: {0} (must be finite and positive)")]
    InvalidRadius(f64),
    #[error("Invalid spiral angle: {0} (must be finite and positive)")]
    InvalidAngle(f64),
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

#[derive(Debug, Error, PartialEq)]
pub enum QuestionnaireError {
    #[error("Hours of sleep out of range: {0} (expected 0..=12 in half-hour steps)")]
    HoursOfSleep(f32),
    #[error("Mood out of range: {0} (expected 1..=5)")]
    Mood(u8),
}

/// True for finite values strictly greater than zero
#[inline]
pub fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Check a value lies on a half-unit grid within [min, max]
pub fn is_half_step_in_range(value: f32, min: f32, max: f32) -> bool {
    if !value.is_finite() || value < min || value > max {
        return false;
    }
    let doubled = value * 2.0;
    (doubled - doubled.round()).abs() < 1e-4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_positive() {
        assert!(is_positive(1.0));
        assert!(!is_positive(0.0));
        assert!(!is_positive(-1.0));
        assert!(!is_positive(f64::NAN));
        assert!(!is_positive(f64::INFINITY));
    }

    #[test]
    fn test_half_step_range() {
        assert!(is_half_step_in_range(7.5, 0.0, 12.0));
        assert!(is_half_step_in_range(0.0, 0.0, 12.0));
        assert!(!is_half_step_in_range(7.3, 0.0, 12.0));
        assert!(!is_half_step_in_range(12.5, 0.0, 12.0));
        assert!(!is_half_step_in_range(f32::NAN, 0.0, 12.0));
    }
}
