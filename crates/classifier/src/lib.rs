//! Spiral drawing classifier backends
//!
//! The classifier judges a rendered attempt and returns the confidence that
//! it matches the stencil. Supports a remote WebSocket server and a static
//! backend for offline use.

mod fixed;
mod protocol;
mod remote;

pub use fixed::StaticClassifier;
pub use protocol::{ClassifierReply, encode_png, parse_reply};
pub use remote::RemoteClassifier;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Classifier reported an error: {0}")]
    Server(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Cancelled")]
    Cancelled,
}

/// Trait for classifier backends
#[allow(async_fn_in_trait)]
pub trait ClassifierBackend {
    /// Confidence in `[0, 1]` that the image matches the stencil
    async fn classify(&mut self, image: &image::RgbaImage) -> Result<f64, ClassifierError>;

    /// Cancel the current classification
    fn cancel(&mut self);

    /// Check if currently classifying
    fn is_classifying(&self) -> bool;
}

/// Sets a classifying flag and clears it on drop, including when the
/// request future is dropped by a timeout
pub(crate) struct ClassifyingGuard(Arc<AtomicBool>);

impl ClassifyingGuard {
    pub(crate) fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for ClassifyingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
