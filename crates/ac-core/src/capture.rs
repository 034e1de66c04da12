use std::sync::Arc;

use crate::frame::CharacterGrid;

/// Ce que l'affichage suit.
///
/// # Example
/// ```
/// use ac_core::capture::CaptureState;
/// assert!(matches!(CaptureState::default(), CaptureState::Live));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CaptureState {
    /// L'affichage suit la dernière grille publiée.
    #[default]
    Live,
    /// L'affichage montre une grille figée, découplée du flux.
    Frozen(Arc<CharacterGrid>),
}

/// Holds the Live/Frozen state and the latest published grid.
///
/// Single source of truth for what is displayed and what is exportable.
/// Freezing never pauses sampling; the render loop keeps publishing.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use ac_core::capture::CaptureController;
/// use ac_core::frame::CharacterGrid;
///
/// let mut capture = CaptureController::new();
/// assert!(!capture.capture());
///
/// capture.publish(Arc::new(CharacterGrid::from_lines(&["ab"]).unwrap()));
/// assert!(capture.capture());
/// assert!(capture.is_frozen());
///
/// capture.publish(Arc::new(CharacterGrid::from_lines(&["cd"]).unwrap()));
/// assert_eq!(capture.displayed_grid().unwrap().to_text(), "ab\n");
///
/// capture.reset();
/// assert_eq!(capture.displayed_grid().unwrap().to_text(), "cd\n");
/// ```
#[derive(Debug, Default)]
pub struct CaptureController {
    state: CaptureState,
    live: Option<Arc<CharacterGrid>>,
}

impl CaptureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the newest Live grid. Does not touch a Frozen grid.
    pub fn publish(&mut self, grid: Arc<CharacterGrid>) {
        self.live = Some(grid);
    }

    /// Fige la grille Live courante.
    ///
    /// No-op (returns `false`) if no grid was ever published or if already Frozen.
    pub fn capture(&mut self) -> bool {
        match (&self.state, &self.live) {
            (CaptureState::Live, Some(grid)) => {
                self.state = CaptureState::Frozen(Arc::clone(grid));
                log::debug!("capture: grille figée ({} lignes)", grid.height());
                true
            }
            _ => false,
        }
    }

    /// Frozen → Live. No-op (returns `false`) when already Live.
    pub fn reset(&mut self) -> bool {
        if matches!(self.state, CaptureState::Frozen(_)) {
            self.state = CaptureState::Live;
            log::debug!("capture: retour au flux live");
            true
        } else {
            false
        }
    }

    /// Forget the latest Live grid (camera deactivated). Frozen grid is kept.
    pub fn clear_live(&mut self) {
        self.live = None;
    }

    /// Frozen grid if any, else latest Live grid, else `None`.
    #[must_use]
    pub fn displayed_grid(&self) -> Option<&Arc<CharacterGrid>> {
        match &self.state {
            CaptureState::Frozen(grid) => Some(grid),
            CaptureState::Live => self.live.as_ref(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, CaptureState::Frozen(_))
    }

    /// `true` once at least one Live grid has been published since the last `clear_live`.
    #[must_use]
    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Arc<CharacterGrid> {
        Arc::new(CharacterGrid::from_lines(&[text]).unwrap())
    }

    #[test]
    fn displayed_grid_is_none_before_first_publish() {
        let capture = CaptureController::new();
        assert!(capture.displayed_grid().is_none());
        assert_eq!(capture.state(), &CaptureState::Live);
    }

    #[test]
    fn capture_without_grid_is_noop() {
        let mut capture = CaptureController::new();
        assert!(!capture.capture());
        assert!(!capture.is_frozen());
    }

    #[test]
    fn capture_when_frozen_keeps_first_grid() {
        let mut capture = CaptureController::new();
        capture.publish(grid("one"));
        assert!(capture.capture());
        capture.publish(grid("two"));
        assert!(!capture.capture());
        assert_eq!(capture.displayed_grid().unwrap().to_text(), "one\n");
    }

    #[test]
    fn reset_returns_to_live_and_tracks_new_frames() {
        let mut capture = CaptureController::new();
        capture.publish(grid("one"));
        capture.capture();
        assert!(capture.reset());
        assert!(!capture.reset());
        capture.publish(grid("two"));
        assert_eq!(capture.displayed_grid().unwrap().to_text(), "two\n");
        capture.publish(grid("three"));
        assert_eq!(capture.displayed_grid().unwrap().to_text(), "three\n");
    }

    #[test]
    fn clear_live_keeps_frozen_grid() {
        let mut capture = CaptureController::new();
        capture.publish(grid("one"));
        capture.capture();
        capture.clear_live();
        assert_eq!(capture.displayed_grid().unwrap().to_text(), "one\n");
        capture.reset();
        assert!(capture.displayed_grid().is_none());
    }
}
