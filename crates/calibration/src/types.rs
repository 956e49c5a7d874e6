use serde::{Deserialize, Serialize};

/// A traced point, relative to the drawing surface centre
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the centre
    #[inline]
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle in (-pi, pi]
    #[inline]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Points captured between one pointer-down and the matching pointer-up
///
/// Serializes as a bare point array so drawings read as `[[{x, y}, ...], ...]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}

impl From<Vec<Point>> for Stroke {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point> for Stroke {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// All strokes of one attempt, in commit order
pub type Drawing = Vec<Stroke>;

/// Total number of points across a set of strokes
pub fn point_count(strokes: &[Stroke]) -> usize {
    strokes.iter().map(Stroke::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_polar() {
        let p = Point::new(0.0, 2.0);
        assert!((p.radius() - 2.0).abs() < 1e-12);
        assert!((p.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(Point::ORIGIN.angle(), 0.0);
    }

    #[test]
    fn test_stroke_serializes_as_point_array() {
        let stroke: Stroke = vec![Point::new(1.0, 2.0)].into();
        let json = serde_json::to_string(&stroke).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0}]"#);

        let drawing: Drawing = serde_json::from_str(r#"[[{"x":1,"y":2}],[]]"#).unwrap();
        assert_eq!(drawing.len(), 2);
        assert!(drawing[1].is_empty());
        assert_eq!(point_count(&drawing), 1);
    }
}
