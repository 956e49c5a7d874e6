//! Radial deviation of traced points from the spiral template
//!
//! The template winds several times, so a point's polar angle alone does not
//! say which winding it was meant to follow. For each point the search tries
//! every winding that shares the point's direction, `θ0 + k·2π`, keeps the
//! one whose template point is nearest, and measures the radial gap there.
//!
//! Cost is O(points × windings); with three windings that is at most three
//! candidates per point.

use serde::Serialize;

use crate::constants::WINDING;
use crate::spiral::SpiralParams;
use crate::types::{Point, Stroke};

/// How one traced point relates to the template
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointDeviation {
    /// Template angle the point was matched to
    pub best_angle: f64,
    /// Template radius at `best_angle`
    pub template_radius: f64,
    /// Distance of the point from the centre
    pub actual_radius: f64,
    /// `|actual_radius - template_radius|` in pixels
    pub error: f64,
}

/// Aggregate deviation over a drawing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DeviationReport {
    pub point_count: usize,
    /// Sum of per-point errors in pixels
    pub total_error: f64,
    /// Mean per-point error divided by the template radius
    pub normalized_error: f64,
    /// Largest single point error in pixels
    pub max_point_error: f64,
}

/// Template angle nearest to `point` among the windings in its direction
///
/// Candidates are tried in increasing winding order and only a strictly
/// closer candidate replaces the current best, so ties go to the innermost
/// winding. Returns 0 when no candidate lies inside the template.
pub fn best_matching_angle(point: Point, params: &SpiralParams) -> f64 {
    let base = point.angle();
    let total = params.total_angle();
    // base > -π, so no candidate past this winding can be < total
    let max_winding = ((total - base) / WINDING).ceil().max(0.0) as u32;

    let mut best_angle = 0.0;
    let mut best_distance = f64::INFINITY;
    for k in 0..=max_winding {
        let candidate = base + k as f64 * WINDING;
        if candidate >= total {
            break;
        }
        if candidate < 0.0 {
            continue;
        }
        let distance = point.distance(params.point_at(candidate));
        if distance < best_distance {
            best_distance = distance;
            best_angle = candidate;
        }
    }
    best_angle
}

/// Match one point to the template and measure its radial error
pub fn point_deviation(point: Point, params: &SpiralParams) -> PointDeviation {
    let best_angle = best_matching_angle(point, params);
    let template_radius = params.radius_at(best_angle).abs();
    let actual_radius = point.radius();
    PointDeviation {
        best_angle,
        template_radius,
        actual_radius,
        error: (actual_radius - template_radius).abs(),
    }
}

/// Per-point deviations for every point of every stroke, in order
pub fn point_deviations<'a>(
    strokes: &'a [Stroke],
    params: &'a SpiralParams,
) -> impl Iterator<Item = PointDeviation> + 'a {
    strokes
        .iter()
        .flat_map(|stroke| stroke.iter())
        .map(move |&point| point_deviation(point, params))
}

/// Aggregate deviation over all strokes
///
/// An empty drawing reports zero error with a zero point count.
pub fn deviation_report(strokes: &[Stroke], params: &SpiralParams) -> DeviationReport {
    let mut report = DeviationReport::default();
    for deviation in point_deviations(strokes, params) {
        report.point_count += 1;
        report.total_error += deviation.error;
        report.max_point_error = report.max_point_error.max(deviation.error);
    }
    if report.point_count > 0 {
        report.normalized_error =
            report.total_error / report.point_count as f64 / params.max_radius();
    }
    report
}

/// Mean radial error normalized by the template radius
///
/// Dimensionless; near 0 for a faithful trace and unbounded above for wild
/// strokes. Returns 0 for a drawing with no points: an empty attempt is an
/// abstention, and callers are expected to reject it before scoring.
pub fn estimate_error(strokes: &[Stroke], params: &SpiralParams) -> f64 {
    deviation_report(strokes, params).normalized_error
}
