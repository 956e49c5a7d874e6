//! Spiral calibration core - template model, stroke capture and scoring
//!
//! This crate provides the pure parts of the spiral tracing assessment:
//! - [`spiral`] - Archimedean spiral template and lazy sampling
//! - [`session`] - Stroke capture with a bounded linear undo history
//! - [`surface`] - RGBA drawing surface and snapshots
//! - [`deviation`] - Radial deviation of traced points from the template
//! - [`score`] - Fusion of deviation and classifier confidence into a score
//! - [`record`] - Result records and an in-memory result log
//!
//! Nothing here performs I/O. The classifier and result storage are
//! collaborators supplied by the caller.

pub mod constants;
pub mod deviation;
pub mod record;
pub mod score;
pub mod session;
pub mod spiral;
pub mod surface;
pub mod types;
pub mod validation;

pub use constants::*;
pub use deviation::*;
pub use record::*;
pub use score::*;
pub use session::*;
pub use spiral::*;
pub use surface::*;
pub use types::*;
pub use validation::*;

pub use spiralcal_config::ScoringScope;
