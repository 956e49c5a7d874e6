//! Thread-safe append-only log of calibration results.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::CalibrationResult;
use super::events::RecordEvent;

/// Collection name used in record keys.
pub const RESULT_COLLECTION: &str = "calibrationStats";

/// Thread-safe append-only log of calibration results.
///
/// Uses interior mutability via RwLock so one log can be shared between the
/// analyzer and whatever reads the history back.
pub struct ResultLog {
    records: RwLock<Vec<(String, CalibrationResult)>>,
    /// Next record number; never reset so keys stay unique after `clear`
    next_id: AtomicU64,
    #[allow(clippy::type_complexity)]
    event_listeners: RwLock<Vec<Box<dyn Fn(RecordEvent) + Send + Sync>>>,
}

impl std::fmt::Debug for ResultLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record_count = self.records.read().map(|r| r.len()).unwrap_or(0);
        let listener_count = self.event_listeners.read().map(|l| l.len()).unwrap_or(0);
        f.debug_struct("ResultLog")
            .field("record_count", &record_count)
            .field("listener_count", &listener_count)
            .finish()
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
            event_listeners: RwLock::new(Vec::new()),
        }
    }
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result and return its key.
    ///
    /// Emits a `Stored` event to all registered listeners.
    pub fn append(&self, result: CalibrationResult) -> String {
        let key = {
            let mut records = self.records.write().expect("ResultLog lock poisoned");
            let key = Self::record_key(self.next_id.fetch_add(1, Ordering::SeqCst));
            records.push((key.clone(), result.clone()));
            key
        };

        self.emit_event(RecordEvent::Stored {
            key: key.clone(),
            result,
        });
        key
    }

    pub fn get(&self, key: &str) -> Option<CalibrationResult> {
        let records = self.records.read().expect("ResultLog lock poisoned");
        records
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, result)| result.clone())
    }

    /// All results in insertion order.
    pub fn records(&self) -> Vec<CalibrationResult> {
        let records = self.records.read().expect("ResultLog lock poisoned");
        records.iter().map(|(_, result)| result.clone()).collect()
    }

    /// Most recent result, if any.
    pub fn latest(&self) -> Option<CalibrationResult> {
        let records = self.records.read().expect("ResultLog lock poisoned");
        records.last().map(|(_, result)| result.clone())
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("ResultLog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every result.
    pub fn clear(&self) {
        let removed = {
            let mut records = self.records.write().expect("ResultLog lock poisoned");
            let removed = records.len();
            records.clear();
            removed
        };
        self.emit_event(RecordEvent::Cleared { removed });
    }

    /// Register an event listener.
    pub fn add_event_listener<F>(&self, listener: F)
    where
        F: Fn(RecordEvent) + Send + Sync + 'static,
    {
        let mut listeners = self.event_listeners.write().expect("ResultLog lock poisoned");
        listeners.push(Box::new(listener));
    }

    fn emit_event(&self, event: RecordEvent) {
        let listeners = self.event_listeners.read().expect("ResultLog lock poisoned");
        for listener in listeners.iter() {
            listener(event.clone());
        }
    }

    /// Key for the n-th stored record.
    ///
    /// Format: `calibrationStats/{n}`
    pub fn record_key(n: u64) -> String {
        format!("{}/{}", RESULT_COLLECTION, n)
    }
}
