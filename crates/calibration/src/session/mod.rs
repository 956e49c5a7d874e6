//! Stroke capture session
//!
//! A session owns everything one tracing attempt mutates:
//! - the drawing surface with the guide spiral painted on it
//! - the in-progress stroke and the committed drawing
//! - a bounded linear undo history of surface snapshots
//!
//! Input comes in via `begin`, `extend` and `end`. Undo and redo only move
//! through the snapshot history; which committed strokes are scored is
//! controlled by [`ScoringScope`].

mod stroke;
mod undo;

use std::borrow::Cow;

use image::Rgba;
use spiralcal_config::{CalibrationConfig, ScoringScope};
use tracing::debug;

use crate::constants::STROKE_COLOR;
use crate::spiral::SpiralParams;
use crate::surface::{CanvasSurface, Snapshot};
use crate::types::{Drawing, Stroke, point_count};
use crate::validation::ParamError;

/// Whether a gesture is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Drawing,
}

/// One undo level: the surface after a stroke, and the stroke that produced it
///
/// The template-only entry at index 0 has no stroke.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: Snapshot,
    pub stroke: Option<usize>,
}

/// Options for a new session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub width: u32,
    pub height: u32,
    pub stroke_width: f32,
    pub stroke_color: Rgba<u8>,
    pub sample_step: f64,
    pub max_undo_levels: usize,
    pub scoring_scope: ScoringScope,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&CalibrationConfig::default())
    }
}

impl From<&CalibrationConfig> for SessionOptions {
    fn from(config: &CalibrationConfig) -> Self {
        Self {
            width: config.canvas.width,
            height: config.canvas.height,
            stroke_width: config.canvas.stroke_width,
            stroke_color: STROKE_COLOR,
            sample_step: config.template.sample_step,
            max_undo_levels: config.history.max_undo_levels,
            scoring_scope: config.history.scoring_scope,
        }
    }
}

/// One tracing attempt over the spiral template
///
/// Lifecycle: create, mutate via `begin`/`extend`/`end`/`undo`/`clear`,
/// read for analysis, discard.
pub struct CalibrationSession {
    params: SpiralParams,
    surface: CanvasSurface,
    state: SessionState,
    /// Stroke being captured (empty when idle)
    pub(crate) current: Stroke,
    /// Every committed stroke since the last clear
    pub(crate) drawing: Drawing,
    /// Snapshot history, index 0 is the template-only surface
    pub(crate) history: Vec<HistoryEntry>,
    /// Current history position
    pub(crate) index: usize,
    /// Strokes whose history entries were dropped by the undo bound
    pub(crate) folded: Vec<usize>,
    pub(crate) max_undo_levels: usize,
    scoring_scope: ScoringScope,
    stroke_width: f32,
    stroke_color: Rgba<u8>,
}

impl std::fmt::Debug for CalibrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationSession")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("strokes", &self.drawing.len())
            .field("history_len", &self.history.len())
            .field("index", &self.index)
            .field("scoring_scope", &self.scoring_scope)
            .finish()
    }
}

impl CalibrationSession {
    /// Create a session sized and configured from a calibration config
    pub fn new(config: &CalibrationConfig) -> Result<Self, ParamError> {
        let params = SpiralParams::from_config(config)?;
        Ok(Self::with_params(params, SessionOptions::from(config)))
    }

    /// Create a session with explicit template geometry
    pub fn with_params(params: SpiralParams, options: SessionOptions) -> Self {
        let mut surface = CanvasSurface::new(options.width, options.height);
        surface.draw_template(&params, options.sample_step);
        let template = surface.capture();

        debug!(
            "New calibration session: {}x{}, max_radius={:.1}",
            options.width,
            options.height,
            params.max_radius()
        );

        Self {
            params,
            surface,
            state: SessionState::Idle,
            current: Stroke::new(),
            drawing: Vec::new(),
            history: vec![HistoryEntry {
                snapshot: template,
                stroke: None,
            }],
            index: 0,
            folded: Vec::new(),
            max_undo_levels: options.max_undo_levels.max(1),
            scoring_scope: options.scoring_scope,
            stroke_width: options.stroke_width,
            stroke_color: options.stroke_color,
        }
    }

    pub fn params(&self) -> &SpiralParams {
        &self.params
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if a stroke is currently in progress
    pub fn is_drawing(&self) -> bool {
        self.state == SessionState::Drawing
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn current_stroke(&self) -> &Stroke {
        &self.current
    }

    /// Every committed stroke, including ones hidden by undo
    pub fn drawing(&self) -> &[Stroke] {
        &self.drawing
    }

    pub fn scoring_scope(&self) -> ScoringScope {
        self.scoring_scope
    }

    pub fn set_scoring_scope(&mut self, scope: ScoringScope) {
        self.scoring_scope = scope;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.index
    }

    /// Snapshot currently shown on the surface
    pub fn visible_snapshot(&self) -> &Snapshot {
        &self.history[self.checked_index()].snapshot
    }

    /// The template-only snapshot
    pub fn template_snapshot(&self) -> &Snapshot {
        &self.history[0].snapshot
    }

    /// True once at least one stroke is shown
    pub fn has_attempt(&self) -> bool {
        self.index > 0
    }

    /// Indices into [`Self::drawing`] of strokes shown at the current position
    pub fn visible_stroke_indices(&self) -> Vec<usize> {
        self.stroke_indices_through(self.checked_index())
    }

    /// Indices of strokes on the current history branch, shown or undone
    ///
    /// Undone strokes stay on the branch until a new commit overwrites them.
    pub fn branch_stroke_indices(&self) -> Vec<usize> {
        self.stroke_indices_through(self.history.len() - 1)
    }

    /// Folded strokes plus those of history entries `1..=last`
    fn stroke_indices_through(&self, last: usize) -> Vec<usize> {
        if last == 0 {
            return Vec::new();
        }
        let entries = self.history[1..=last]
            .iter()
            .filter_map(|entry| entry.stroke);
        self.folded.iter().copied().chain(entries).collect()
    }

    fn strokes_at(&self, indices: Vec<usize>) -> Vec<Stroke> {
        indices
            .into_iter()
            .filter_map(|i| self.drawing.get(i).cloned())
            .collect()
    }

    /// Strokes taking part in scoring under the current scope
    pub fn scored_strokes(&self) -> Cow<'_, [Stroke]> {
        match self.scoring_scope {
            ScoringScope::AllCommitted => Cow::Borrowed(&self.drawing),
            ScoringScope::CurrentBranch => {
                Cow::Owned(self.strokes_at(self.branch_stroke_indices()))
            }
            ScoringScope::Visible => Cow::Owned(self.strokes_at(self.visible_stroke_indices())),
        }
    }

    /// Number of points that will be scored
    pub fn scored_point_count(&self) -> usize {
        point_count(&self.scored_strokes())
    }

    /// Reset to the template-only state
    pub fn clear(&mut self) {
        let template = self.history[0].snapshot.clone();
        self.surface.restore(&template);
        self.history.truncate(1);
        self.index = 0;
        self.drawing.clear();
        self.folded.clear();
        self.current = Stroke::new();
        self.state = SessionState::Idle;
        debug!("Session cleared");
    }

    /// History index, clamped to a valid entry
    ///
    /// An out-of-range index is a bug; debug builds stop here.
    pub(crate) fn checked_index(&self) -> usize {
        debug_assert!(
            self.index < self.history.len(),
            "history index {} out of bounds ({} entries)",
            self.index,
            self.history.len()
        );
        self.index.min(self.history.len() - 1)
    }

    pub(crate) fn surface_mut(&mut self) -> &mut CanvasSurface {
        &mut self.surface
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn stroke_style(&self) -> (f32, Rgba<u8>) {
        (self.stroke_width, self.stroke_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn small_session(max_undo_levels: usize, scope: ScoringScope) -> CalibrationSession {
        let params = SpiralParams::with_max_radius(30.0).unwrap();
        CalibrationSession::with_params(
            params,
            SessionOptions {
                width: 100,
                height: 100,
                max_undo_levels,
                scoring_scope: scope,
                ..SessionOptions::default()
            },
        )
    }

    fn trace(session: &mut CalibrationSession, points: &[(f64, f64)]) {
        let mut iter = points.iter().map(|&(x, y)| Point::new(x, y));
        if let Some(first) = iter.next() {
            session.begin(first);
        }
        for p in iter {
            session.extend(p);
        }
        session.end();
    }

    #[test]
    fn test_new_session_is_template_only() {
        let session = small_session(20, ScoringScope::AllCommitted);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.history_index(), 0);
        assert!(!session.has_attempt());
        assert!(session.drawing().is_empty());
        assert_eq!(session.visible_snapshot(), session.template_snapshot());
    }

    #[test]
    fn test_session_from_default_config() {
        let session = CalibrationSession::new(&CalibrationConfig::default()).unwrap();
        assert_eq!(session.surface().width(), 600);
        assert!((session.params().max_radius() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = small_session(20, ScoringScope::AllCommitted);
        trace(&mut session, &[(0.0, 0.0), (5.0, 5.0)]);
        trace(&mut session, &[(10.0, 0.0), (12.0, 3.0)]);
        session.undo();

        session.clear();
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.history_index(), 0);
        assert!(session.drawing().is_empty());
        assert!(session.scored_strokes().is_empty());
        assert_eq!(session.surface().capture(), *session.template_snapshot());
    }

    #[test]
    fn test_scoring_scope_all_committed_ignores_undo() {
        let mut session = small_session(20, ScoringScope::AllCommitted);
        trace(&mut session, &[(0.0, 0.0), (5.0, 5.0)]);
        trace(&mut session, &[(10.0, 0.0)]);
        session.undo();

        assert_eq!(session.scored_strokes().len(), 2);
        assert_eq!(session.scored_point_count(), 3);
    }

    #[test]
    fn test_scoring_scope_visible_follows_undo() {
        let mut session = small_session(20, ScoringScope::Visible);
        trace(&mut session, &[(0.0, 0.0), (5.0, 5.0)]);
        trace(&mut session, &[(10.0, 0.0)]);
        session.undo();

        let scored = session.scored_strokes();
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].len(), 2);

        session.redo();
        assert_eq!(session.scored_strokes().len(), 2);
    }

    #[test]
    fn test_current_branch_scope_keeps_undone_until_overwritten() {
        let mut session = small_session(20, ScoringScope::CurrentBranch);
        trace(&mut session, &[(1.0, 1.0)]);
        trace(&mut session, &[(2.0, 2.0)]);
        session.undo();
        assert_eq!(session.scored_strokes().len(), 2);

        trace(&mut session, &[(3.0, 3.0)]);
        let scored = session.scored_strokes();
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].points[0], Point::new(1.0, 1.0));
        assert_eq!(scored[1].points[0], Point::new(3.0, 3.0));
    }

    #[test]
    fn test_visible_scope_hides_folded_strokes_at_template() {
        let mut session = small_session(1, ScoringScope::Visible);
        for x in 0..4 {
            trace(&mut session, &[(x as f64, 0.0)]);
        }
        assert_eq!(session.scored_strokes().len(), 4);

        while session.undo() {}
        assert!(session.scored_strokes().is_empty());

        session.set_scoring_scope(ScoringScope::CurrentBranch);
        assert_eq!(session.scored_strokes().len(), 4);
    }

    #[test]
    fn test_visible_scope_drops_overwritten_branch() {
        let mut session = small_session(20, ScoringScope::Visible);
        trace(&mut session, &[(1.0, 1.0)]);
        trace(&mut session, &[(2.0, 2.0)]);
        session.undo();
        trace(&mut session, &[(3.0, 3.0)]);

        assert_eq!(session.drawing().len(), 3);
        let scored = session.scored_strokes();
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].points[0], Point::new(1.0, 1.0));
        assert_eq!(scored[1].points[0], Point::new(3.0, 3.0));
    }
}
