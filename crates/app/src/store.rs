//! Result storage contract

use calibration::{CalibrationResult, ResultLog};
use thiserror::Error;

/// Storage failures, kept apart from scoring failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Result rejected by store: {0}")]
    Rejected(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Destination for finished calibration results
#[allow(async_fn_in_trait)]
pub trait ResultStore {
    /// Persist a result and return its document key
    async fn store(&self, result: &CalibrationResult) -> Result<String, StoreError>;
}

impl ResultStore for ResultLog {
    async fn store(&self, result: &CalibrationResult) -> Result<String, StoreError> {
        Ok(self.append(result.clone()))
    }
}
