//! CPU drawing surface and snapshots
//!
//! Points handed to the surface are centre-relative; the surface converts
//! them to pixel coordinates with the origin at the top-left corner.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::constants::{BACKGROUND_COLOR, TEMPLATE_COLOR, TEMPLATE_LINE_WIDTH};
use crate::spiral::SpiralParams;
use crate::types::Point;

/// Upper bound on stamps per segment, for points far off the surface
const MAX_SEGMENT_STAMPS: u32 = 1 << 16;

/// Immutable raster capture of the surface
///
/// Cloning is cheap; the pixel buffer is shared.
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<RgbaImage>);

impl Snapshot {
    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// True if both snapshots share the same buffer
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

/// An 8-bit RGBA surface that strokes and the guide curve are painted onto
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    image: RgbaImage,
}

impl CanvasSurface {
    /// Create a surface filled with the background colour
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, BACKGROUND_COLOR),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel coordinates of the surface centre
    pub fn center(&self) -> (f32, f32) {
        (self.width() as f32 / 2.0, self.height() as f32 / 2.0)
    }

    /// Convert a centre-relative point to pixel coordinates
    #[inline]
    pub fn to_pixel(&self, point: Point) -> (f32, f32) {
        let (cx, cy) = self.center();
        (point.x as f32 + cx, point.y as f32 + cy)
    }

    /// Convert pixel coordinates to a centre-relative point
    #[inline]
    pub fn from_pixel(&self, x: f32, y: f32) -> Point {
        let (cx, cy) = self.center();
        Point::new((x - cx) as f64, (y - cy) as f64)
    }

    /// Fill the whole surface with a solid colour
    pub fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Blend a colour onto an existing pixel using alpha compositing
    /// Formula: out = src * alpha + dst * (1 - alpha)
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>, opacity: f32) {
        let Some(dst) = self.image.get_pixel_mut_checked(x, y) else {
            return;
        };
        let alpha = (color[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        let inv_alpha = 1.0 - alpha;
        for channel in 0..3 {
            let blended = color[channel] as f32 * alpha + dst[channel] as f32 * inv_alpha;
            dst[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
        let out_alpha = alpha * 255.0 + dst[3] as f32 * inv_alpha;
        dst[3] = out_alpha.round().clamp(0.0, 255.0) as u8;
    }

    /// Stamp an anti-aliased disc centred at pixel coordinates
    /// Returns false if the disc lies completely outside the surface
    pub fn stamp_disc(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: Rgba<u8>,
    ) -> bool {
        if !(radius > 0.0) || !center_x.is_finite() || !center_y.is_finite() {
            return false;
        }

        // One extra pixel for the anti-aliased rim
        let reach = radius + 0.5;
        let x_min = ((center_x - reach).floor().max(0.0) as u32).min(self.width());
        let y_min = ((center_y - reach).floor().max(0.0) as u32).min(self.height());
        let x_max = ((center_x + reach).ceil().max(0.0) as u32).min(self.width());
        let y_max = ((center_y + reach).ceil().max(0.0) as u32).min(self.height());

        if x_min >= x_max || y_min >= y_max {
            return false;
        }

        for py in y_min..y_max {
            for px in x_min..x_max {
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;
                let coverage = edge_coverage((dx * dx + dy * dy).sqrt(), radius);
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, coverage);
                }
            }
        }
        true
    }

    /// Paint a round-capped segment between two centre-relative points
    pub fn draw_segment(&mut self, from: Point, to: Point, width: f32, color: Rgba<u8>) {
        let radius = width / 2.0;
        let (x0, y0) = self.to_pixel(from);
        let (x1, y1) = self.to_pixel(to);
        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let spacing = (radius * 0.5).max(0.5);
        let steps = ((length / spacing).ceil().max(1.0) as u32).min(MAX_SEGMENT_STAMPS);

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp_disc(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, radius, color);
        }
    }

    /// Paint a single round dot at a centre-relative point
    pub fn draw_dot(&mut self, point: Point, width: f32, color: Rgba<u8>) {
        let (x, y) = self.to_pixel(point);
        self.stamp_disc(x, y, width / 2.0, color);
    }

    /// Paint connected segments through the given points
    pub fn draw_polyline<I>(&mut self, points: I, width: f32, color: Rgba<u8>)
    where
        I: IntoIterator<Item = Point>,
    {
        let mut previous: Option<Point> = None;
        for point in points {
            match previous {
                Some(from) => self.draw_segment(from, point, width, color),
                None => self.draw_dot(point, width, color),
            }
            previous = Some(point);
        }
    }

    /// Paint the guide spiral sampled at `step` radians
    pub fn draw_template(&mut self, params: &SpiralParams, step: f64) {
        debug!(
            "Drawing template: max_radius={:.1}, total_angle={:.3}, step={}",
            params.max_radius(),
            params.total_angle(),
            step
        );
        self.draw_polyline(params.samples(step), TEMPLATE_LINE_WIDTH, TEMPLATE_COLOR);
    }

    /// Capture the current pixels
    pub fn capture(&self) -> Snapshot {
        Snapshot(Arc::new(self.image.clone()))
    }

    /// Replace the current pixels with a snapshot
    ///
    /// Snapshots of a different size are ignored.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        if snapshot.width() != self.width() || snapshot.height() != self.height() {
            debug!(
                "restore: snapshot {}x{} does not match surface {}x{}, ignoring",
                snapshot.width(),
                snapshot.height(),
                self.width(),
                self.height()
            );
            return;
        }
        self.image.clone_from(snapshot.image());
    }
}

/// Coverage of a pixel whose centre is `distance` from a disc of `radius`
/// 1.0 inside, 0.0 outside, linear across a one pixel rim
#[inline]
fn edge_coverage(distance: f32, radius: f32) -> f32 {
    (radius - distance + 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_SAMPLE_STEP, STROKE_COLOR};

    #[test]
    fn test_new_surface_is_background() {
        let surface = CanvasSurface::new(10, 8);
        assert_eq!(surface.width(), 10);
        assert_eq!(surface.height(), 8);
        assert_eq!(surface.get_pixel(3, 3), Some(BACKGROUND_COLOR));
        assert_eq!(surface.get_pixel(10, 0), None);
    }

    #[test]
    fn test_pixel_conversion_roundtrip() {
        let surface = CanvasSurface::new(600, 400);
        assert_eq!(surface.to_pixel(Point::ORIGIN), (300.0, 200.0));
        let p = surface.from_pixel(310.0, 190.0);
        assert_eq!(p, Point::new(10.0, -10.0));
    }

    #[test]
    fn test_blend_pixel() {
        let mut surface = CanvasSurface::new(4, 4);
        surface.blend_pixel(1, 1, Rgba([255, 0, 0, 255]), 0.5);
        let pixel = surface.get_pixel(1, 1).unwrap();
        assert_eq!(pixel[0], 255);
        assert!((pixel[1] as i32 - 128).abs() <= 1);
        assert!((pixel[2] as i32 - 128).abs() <= 1);
        assert_eq!(pixel[3], 255);

        // Out of bounds is ignored
        surface.blend_pixel(40, 40, STROKE_COLOR, 1.0);
    }

    #[test]
    fn test_stamp_disc() {
        let mut surface = CanvasSurface::new(20, 20);
        assert!(surface.stamp_disc(10.0, 10.0, 3.0, STROKE_COLOR));
        assert_eq!(surface.get_pixel(10, 10), Some(STROKE_COLOR));
        assert_eq!(surface.get_pixel(0, 0), Some(BACKGROUND_COLOR));

        assert!(!surface.stamp_disc(-50.0, -50.0, 3.0, STROKE_COLOR));
        assert!(!surface.stamp_disc(10.0, 10.0, 0.0, STROKE_COLOR));
    }

    #[test]
    fn test_draw_segment_covers_endpoints() {
        let mut surface = CanvasSurface::new(40, 40);
        surface.draw_segment(Point::new(-10.0, 0.0), Point::new(10.0, 0.0), 3.0, STROKE_COLOR);
        assert_eq!(surface.get_pixel(10, 20), Some(STROKE_COLOR));
        assert_eq!(surface.get_pixel(20, 20), Some(STROKE_COLOR));
        assert_eq!(surface.get_pixel(29, 20), Some(STROKE_COLOR));
        assert_eq!(surface.get_pixel(20, 30), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_template_leaves_marks() {
        let mut surface = CanvasSurface::new(200, 200);
        let blank = surface.capture();
        let params = SpiralParams::with_max_radius(60.0).unwrap();
        surface.draw_template(&params, DEFAULT_SAMPLE_STEP);
        assert_ne!(surface.capture(), blank);
    }

    #[test]
    fn test_capture_and_restore() {
        let mut surface = CanvasSurface::new(16, 16);
        let before = surface.capture();
        surface.stamp_disc(8.0, 8.0, 4.0, STROKE_COLOR);
        let after = surface.capture();
        assert_ne!(before, after);

        surface.restore(&before);
        assert_eq!(surface.capture(), before);

        // Mismatched sizes are ignored
        let other = CanvasSurface::new(4, 4).capture();
        surface.restore(&other);
        assert_eq!(surface.width(), 16);
    }
}
