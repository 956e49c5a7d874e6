//! Shared configuration for spiral calibration
//!
//! This crate provides the single source of truth for canvas dimensions,
//! template geometry, undo history limits and classifier settings shared by
//! the calibration core, the classifier client and the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default canvas width in pixels
pub const DEFAULT_WIDTH: u32 = 600;

/// Default canvas height in pixels
pub const DEFAULT_HEIGHT: u32 = 600;

/// Default traced line width in pixels
pub const DEFAULT_STROKE_WIDTH: f32 = 3.0;

/// Template radius as a fraction of the smaller canvas dimension
pub const DEFAULT_RADIUS_FRACTION: f64 = 0.3;

/// Number of full windings drawn by the template
pub const DEFAULT_TURNS: f64 = 3.0;

/// Angular sampling step (radians) used when drawing the template
pub const DEFAULT_SAMPLE_STEP: f64 = 0.1;

/// Default number of user snapshots kept for undo
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 20;

/// Default classifier endpoint
pub const DEFAULT_CLASSIFIER_URL: &str = "ws://127.0.0.1:8765/classify";

/// Default per-attempt classifier timeout in milliseconds
pub const DEFAULT_CLASSIFIER_TIMEOUT_MS: u64 = 10_000;

/// Default number of retries after a failed classifier attempt
pub const DEFAULT_CLASSIFIER_RETRIES: u32 = 1;

/// Index of the "matches stencil" class in the classifier's confidence list
pub const DEFAULT_LABEL_INDEX: usize = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which committed strokes take part in scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringScope {
    /// Every stroke committed since the last clear, regardless of undo.
    #[default]
    AllCommitted,
    /// Strokes on the current history branch: undone strokes count until a
    /// new commit overwrites them.
    CurrentBranch,
    /// Only strokes whose snapshot is at or before the current history index.
    Visible,
}

/// Drawing surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    /// Line width used when painting traced strokes
    pub stroke_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl CanvasConfig {
    /// Create a canvas config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Smaller of the two dimensions, as f64 for geometry
    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height) as f64
    }
}

/// Spiral template geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub radius_fraction: f64,
    pub turns: f64,
    pub sample_step: f64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            radius_fraction: DEFAULT_RADIUS_FRACTION,
            turns: DEFAULT_TURNS,
            sample_step: DEFAULT_SAMPLE_STEP,
        }
    }
}

impl TemplateConfig {
    /// Total template angle in radians
    pub fn total_angle(&self) -> f64 {
        self.turns * std::f64::consts::TAU
    }
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo steps that restore the exact previous snapshot; one further
    /// undo always returns to the template
    pub max_undo_levels: usize,
    pub scoring_scope: ScoringScope,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
            scoring_scope: ScoringScope::default(),
        }
    }
}

/// External classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub server_url: String,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first failed attempt
    pub retries: u32,
    /// Which confidence in the reply list to use
    pub label_index: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_CLASSIFIER_URL.to_string(),
            timeout_ms: DEFAULT_CLASSIFIER_TIMEOUT_MS,
            retries: DEFAULT_CLASSIFIER_RETRIES,
            label_index: DEFAULT_LABEL_INDEX,
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// Total attempts including the first one
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// Complete calibration configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub canvas: CanvasConfig,
    pub template: TemplateConfig,
    pub history: HistoryConfig,
    pub classifier: ClassifierConfig,
}

impl CalibrationConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Spiral radius in pixels for the configured canvas
    pub fn max_radius(&self) -> f64 {
        self.canvas.min_dimension() * self.template.radius_fraction
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(invalid(
                "canvas",
                format!("{}x{} has a zero dimension", self.canvas.width, self.canvas.height),
            ));
        }
        if !(self.canvas.stroke_width > 0.0) {
            return Err(invalid(
                "canvas.stroke_width",
                format!("{} must be positive", self.canvas.stroke_width),
            ));
        }
        let fraction = self.template.radius_fraction;
        if !(fraction > 0.0 && fraction <= 0.5) {
            return Err(invalid(
                "template.radius_fraction",
                format!("{fraction} must be in (0, 0.5]"),
            ));
        }
        if !(self.template.turns > 0.0 && self.template.turns.is_finite()) {
            return Err(invalid(
                "template.turns",
                format!("{} must be positive", self.template.turns),
            ));
        }
        if !(self.template.sample_step > 0.0 && self.template.sample_step.is_finite()) {
            return Err(invalid(
                "template.sample_step",
                format!("{} must be positive", self.template.sample_step),
            ));
        }
        if self.history.max_undo_levels == 0 {
            return Err(invalid(
                "history.max_undo_levels",
                "at least one undo level is required".to_string(),
            ));
        }
        if self.classifier.timeout_ms == 0 {
            return Err(invalid(
                "classifier.timeout_ms",
                "timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
