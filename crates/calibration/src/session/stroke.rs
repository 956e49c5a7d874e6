//! Stroke capture for the calibration session

use tracing::debug;

use crate::types::{Point, Stroke};

use super::{CalibrationSession, HistoryEntry, SessionState};

impl CalibrationSession {
    /// Begin a stroke at a centre-relative point
    ///
    /// A `begin` during an unfinished gesture discards that gesture and
    /// reverts its paint before starting again.
    pub fn begin(&mut self, point: Point) {
        if self.is_drawing() {
            debug!(
                "begin: discarding unfinished stroke ({} points)",
                self.current.len()
            );
            let shown = self.visible_snapshot().clone();
            self.surface_mut().restore(&shown);
        }

        let (width, color) = self.stroke_style();
        self.surface_mut().draw_dot(point, width, color);
        self.current = Stroke::starting_at(point);
        self.set_state(SessionState::Drawing);
    }

    /// Continue the current stroke
    ///
    /// Ignored while idle.
    pub fn extend(&mut self, point: Point) {
        if !self.is_drawing() {
            debug!("extend: no active stroke, ignoring");
            return;
        }

        let (width, color) = self.stroke_style();
        if let Some(last) = self.current.last() {
            self.surface_mut().draw_segment(last, point, width, color);
        }
        self.current.push(point);
    }

    /// Commit the current stroke and record an undo level
    ///
    /// Any redo entries beyond the current position are discarded. Ignored
    /// while idle.
    pub fn end(&mut self) {
        if !self.is_drawing() {
            debug!("end: no active stroke, ignoring");
            return;
        }

        let stroke = std::mem::take(&mut self.current);
        let points = stroke.len();
        self.drawing.push(stroke);
        let stroke_index = self.drawing.len() - 1;

        let keep = self.checked_index() + 1;
        if keep < self.history.len() {
            debug!(
                "end: truncating {} redo entries",
                self.history.len() - keep
            );
            self.history.truncate(keep);
            // Committing over the template overwrites folded strokes too
            if keep == 1 {
                self.folded.clear();
            }
        }

        let snapshot = self.surface().capture();
        self.history.push(HistoryEntry {
            snapshot,
            stroke: Some(stroke_index),
        });
        self.index = self.history.len() - 1;

        // Keep the shown entry plus `max_undo_levels` earlier ones; the
        // template entry at index 0 always stays
        while self.history.len() > self.max_undo_levels + 2 {
            let dropped = self.history.remove(1);
            if let Some(stroke) = dropped.stroke {
                self.folded.push(stroke);
            }
            self.index -= 1;
        }

        self.set_state(SessionState::Idle);
        debug!(
            "Committed stroke {} ({} points), history {}/{}",
            stroke_index,
            points,
            self.index,
            self.history.len()
        );
    }

    /// Feed a recorded stroke through begin/extend/end
    ///
    /// Empty strokes are skipped. Returns whether a stroke was committed.
    pub fn replay(&mut self, stroke: &Stroke) -> bool {
        let mut points = stroke.iter().copied();
        let Some(first) = points.next() else {
            return false;
        };
        self.begin(first);
        for point in points {
            self.extend(point);
        }
        self.end();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use crate::spiral::SpiralParams;
    use spiralcal_config::ScoringScope;

    fn session(max_undo_levels: usize) -> CalibrationSession {
        CalibrationSession::with_params(
            SpiralParams::with_max_radius(30.0).unwrap(),
            SessionOptions {
                width: 100,
                height: 100,
                max_undo_levels,
                scoring_scope: ScoringScope::AllCommitted,
                ..SessionOptions::default()
            },
        )
    }

    #[test]
    fn test_begin_extend_end() {
        let mut session = session(20);
        session.begin(Point::new(1.0, 1.0));
        assert!(session.is_drawing());
        session.extend(Point::new(2.0, 2.0));
        session.extend(Point::new(3.0, 3.0));
        assert_eq!(session.current_stroke().len(), 3);

        session.end();
        assert!(!session.is_drawing());
        assert!(session.current_stroke().is_empty());
        assert_eq!(session.drawing().len(), 1);
        assert_eq!(session.drawing()[0].len(), 3);
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.history_index(), 1);
        assert!(session.has_attempt());
    }

    #[test]
    fn test_replay_commits_whole_stroke() {
        let mut session = session(20);
        let stroke: Stroke = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)].into();
        assert!(session.replay(&stroke));
        assert!(!session.replay(&Stroke::new()));
        assert_eq!(session.drawing(), &[stroke][..]);
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn test_extend_and_end_while_idle_are_noops() {
        let mut session = session(20);
        session.extend(Point::new(5.0, 5.0));
        session.end();
        assert!(session.current_stroke().is_empty());
        assert!(session.drawing().is_empty());
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.surface().capture(), *session.template_snapshot());
    }

    #[test]
    fn test_strokes_paint_the_surface() {
        let mut session = session(20);
        session.begin(Point::new(-10.0, -20.0));
        session.extend(Point::new(10.0, -20.0));
        assert_ne!(session.surface().capture(), *session.template_snapshot());
    }

    #[test]
    fn test_rebegin_discards_unfinished_stroke() {
        let mut session = session(20);
        session.begin(Point::new(-10.0, -20.0));
        session.extend(Point::new(10.0, -20.0));
        session.begin(Point::new(0.0, 0.0));

        assert_eq!(session.current_stroke().len(), 1);
        assert!(session.drawing().is_empty());

        session.end();
        assert_eq!(session.drawing().len(), 1);
        assert_eq!(session.drawing()[0].points, vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_end_after_undo_truncates_redo() {
        let mut session = session(20);
        for x in [1.0, 2.0, 3.0] {
            session.begin(Point::new(x, 0.0));
            session.end();
        }
        assert_eq!(session.history_len(), 4);

        session.undo();
        session.undo();
        assert_eq!(session.history_index(), 1);

        session.begin(Point::new(9.0, 0.0));
        session.end();
        assert_eq!(session.history_len(), 3);
        assert_eq!(session.history_index(), 2);
        assert!(!session.can_redo());
        // Drawing keeps every committed stroke
        assert_eq!(session.drawing().len(), 4);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = session(3);
        for x in 0..6 {
            session.begin(Point::new(x as f64, 0.0));
            session.end();
        }
        assert_eq!(session.history_len(), 5);
        assert_eq!(session.history_index(), 4);
        assert_eq!(session.drawing().len(), 6);
        // Folded strokes stay visible while a user entry is shown
        assert_eq!(session.visible_stroke_indices(), vec![0, 1, 2, 3, 4, 5]);

        let mut undone = 0;
        while session.undo() {
            undone += 1;
            if session.history_index() == 1 {
                assert_eq!(session.visible_stroke_indices(), vec![0, 1, 2]);
            }
        }
        assert_eq!(undone, 4);
        assert_eq!(session.history_index(), 0);
        assert!(session.visible_stroke_indices().is_empty());
        assert_eq!(session.surface().capture(), *session.template_snapshot());

        // Redo brings the folded strokes back
        assert!(session.redo());
        assert_eq!(session.visible_stroke_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_undo_reaches_template_after_fold() {
        let mut session = session(20);
        for x in 0..25 {
            session.begin(Point::new(x as f64, 0.0));
            session.end();
        }
        assert_eq!(session.history_len(), 22);
        assert_eq!(session.undo_count(), 21);
        while session.undo() {}
        assert_eq!(session.history_index(), 0);
        assert!(!session.has_attempt());
    }

    #[test]
    fn test_single_undo_level_restores_previous_snapshot() {
        let mut session = session(1);
        for x in [-20.0, 0.0, 20.0] {
            session.begin(Point::new(x, -20.0));
            session.extend(Point::new(x, 20.0));
            let before_end = session.visible_snapshot().clone();
            session.end();

            assert!(session.undo());
            assert_eq!(*session.visible_snapshot(), before_end);
            assert_eq!(session.surface().capture(), before_end);
            assert!(session.redo());
        }
        assert_eq!(session.history_len(), 3);
    }

    #[test]
    fn test_commit_over_template_drops_folded_strokes() {
        let mut session = session(1);
        for x in 0..4 {
            session.begin(Point::new(x as f64, 0.0));
            session.end();
        }
        while session.undo() {}

        session.begin(Point::new(9.0, 9.0));
        session.end();
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.visible_stroke_indices(), vec![4]);
        assert_eq!(session.drawing().len(), 5);
    }
}
