//! Spiral calibration analysis service
//!
//! Ties the calibration core to a classifier backend and a result store:
//! - [`Analyzer`] - One analysis at a time, bounded classifier attempts
//! - [`Analysis`] - Scored or unavailable outcome of an attempt
//! - [`ResultStore`] - Destination for finished results

pub mod analysis;
pub mod store;

pub use analysis::{Analysis, AnalysisError, Analyzer, SubmitError};
pub use store::{ResultStore, StoreError};
