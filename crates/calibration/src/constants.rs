use image::Rgba;

/// Angle spanned by the template: three full windings.
pub const DEFAULT_TOTAL_ANGLE: f64 = 6.0 * std::f64::consts::PI;

/// One winding in radians.
pub const WINDING: f64 = std::f64::consts::TAU;

/// Angular step used when sampling the template for drawing.
pub const DEFAULT_SAMPLE_STEP: f64 = 0.1;

/// Lowest score for each feedback bucket.
pub const EXCELLENT_THRESHOLD: u8 = 90;
pub const GOOD_THRESHOLD: u8 = 80;
pub const MODERATE_THRESHOLD: u8 = 70;

/// Upper bound of the fused score.
pub const MAX_SCORE: f64 = 100.0;

/// Surface background.
pub const BACKGROUND_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Guide curve colour (#cccccc).
pub const TEMPLATE_COLOR: Rgba<u8> = Rgba([204, 204, 204, 255]);

/// Guide curve line width in pixels.
pub const TEMPLATE_LINE_WIDTH: f32 = 1.0;

/// Default ink colour for traced strokes.
pub const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
