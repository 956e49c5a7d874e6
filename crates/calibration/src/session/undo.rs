//! Undo functionality for the calibration session

use tracing::debug;

use super::CalibrationSession;

impl CalibrationSession {
    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.checked_index() > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.checked_index() + 1 < self.history.len()
    }

    /// Get the number of undo levels available
    ///
    /// The last level always returns to the template, even when older
    /// levels were folded away by the undo bound.
    pub fn undo_count(&self) -> usize {
        self.checked_index()
    }

    /// Step back one snapshot
    ///
    /// Only the surface changes; committed strokes stay in the drawing.
    /// Returns true if an undo was performed.
    pub fn undo(&mut self) -> bool {
        if self.is_drawing() {
            debug!("Undo: stroke in progress, ignoring");
            return false;
        }
        if !self.can_undo() {
            debug!("Undo: no entries available");
            return false;
        }

        self.index = self.checked_index() - 1;
        self.show_current();
        debug!("Undo to history index {}", self.index);
        true
    }

    /// Step forward one snapshot after an undo
    ///
    /// Returns true if a redo was performed.
    pub fn redo(&mut self) -> bool {
        if self.is_drawing() {
            debug!("Redo: stroke in progress, ignoring");
            return false;
        }
        if !self.can_redo() {
            debug!("Redo: no entries available");
            return false;
        }

        self.index = self.checked_index() + 1;
        self.show_current();
        debug!("Redo to history index {}", self.index);
        true
    }

    fn show_current(&mut self) {
        let snapshot = self.visible_snapshot().clone();
        self.surface_mut().restore(&snapshot);
    }
}
