//! Events emitted by the result log.

use super::CalibrationResult;

/// Events emitted as results are stored
///
/// Lets external sinks (sync, dashboards) follow the log without coupling
/// to its storage.
#[derive(Debug, Clone)]
pub enum RecordEvent {
    /// A result was appended under `key`.
    Stored {
        key: String,
        result: CalibrationResult,
    },
    /// The log was emptied.
    Cleared { removed: usize },
}
