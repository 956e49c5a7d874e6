//! Archimedean spiral template
//!
//! The template is `r(θ) = max_radius · θ / total_angle` for θ in
//! `[0, total_angle)`, centred on the drawing surface. Angles outside that
//! range are still valid inputs to [`SpiralParams::point_at`]; they describe
//! windings beyond the drawn guide and are used by the deviation search.

use serde::{Deserialize, Serialize};
use spiralcal_config::CalibrationConfig;

use crate::constants::{DEFAULT_TOTAL_ANGLE, WINDING};
use crate::types::Point;
use crate::validation::{ParamError, is_positive};

/// Geometry of the reference spiral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralParams {
    max_radius: f64,
    total_angle: f64,
}

impl SpiralParams {
    pub fn new(max_radius: f64, total_angle: f64) -> Result<Self, ParamError> {
        if !is_positive(max_radius) {
            return Err(ParamError::InvalidRadius(max_radius));
        }
        if !is_positive(total_angle) {
            return Err(ParamError::InvalidAngle(total_angle));
        }
        Ok(Self {
            max_radius,
            total_angle,
        })
    }

    /// Three-winding template with the given outer radius
    pub fn with_max_radius(max_radius: f64) -> Result<Self, ParamError> {
        Self::new(max_radius, DEFAULT_TOTAL_ANGLE)
    }

    /// Template sized to a canvas: `max_radius = min(width, height) · radius_fraction`
    pub fn for_canvas(
        width: u32,
        height: u32,
        radius_fraction: f64,
        turns: f64,
    ) -> Result<Self, ParamError> {
        if width == 0 || height == 0 {
            return Err(ParamError::InvalidCanvas { width, height });
        }
        let max_radius = width.min(height) as f64 * radius_fraction;
        Self::new(max_radius, turns * WINDING)
    }

    pub fn from_config(config: &CalibrationConfig) -> Result<Self, ParamError> {
        Self::for_canvas(
            config.canvas.width,
            config.canvas.height,
            config.template.radius_fraction,
            config.template.turns,
        )
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn total_angle(&self) -> f64 {
        self.total_angle
    }

    /// Number of windings drawn by the template
    pub fn windings(&self) -> f64 {
        self.total_angle / WINDING
    }

    /// Template radius at angle θ
    #[inline]
    pub fn radius_at(&self, theta: f64) -> f64 {
        self.max_radius * theta / self.total_angle
    }

    /// Template point at angle θ, relative to the centre
    #[inline]
    pub fn point_at(&self, theta: f64) -> Point {
        let r = self.radius_at(theta);
        Point::new(r * theta.cos(), r * theta.sin())
    }

    /// Sample the drawn template from θ = 0 while θ < total_angle
    pub fn samples(&self, step: f64) -> SpiralSamples {
        SpiralSamples {
            params: *self,
            step,
            index: 0,
        }
    }
}

/// Point on the default three-winding template with the given outer radius
pub fn spiral_point(max_radius: f64, theta: f64) -> Point {
    let r = max_radius * theta / DEFAULT_TOTAL_ANGLE;
    Point::new(r * theta.cos(), r * theta.sin())
}

/// Lazy, finite sampling of the template curve
///
/// Angles are computed as `index · step` so long runs don't accumulate
/// rounding drift. Call [`SpiralParams::samples`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct SpiralSamples {
    params: SpiralParams,
    step: f64,
    index: usize,
}

impl SpiralSamples {
    fn theta(&self) -> f64 {
        self.index as f64 * self.step
    }
}

impl Iterator for SpiralSamples {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if !is_positive(self.step) {
            return None;
        }
        let theta = self.theta();
        if theta >= self.params.total_angle {
            return None;
        }
        self.index += 1;
        Some(self.params.point_at(theta))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if !is_positive(self.step) {
            return (0, Some(0));
        }
        let remaining = ((self.params.total_angle - self.theta()) / self.step).ceil();
        let remaining = if remaining > 0.0 { remaining as usize } else { 0 };
        (remaining.saturating_sub(1), Some(remaining + 1))
    }
}
