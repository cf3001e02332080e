//! Presentation collaborator interface.

use crate::error::ChannelError;
use strictly_gomoku::{Coordinate, GameState};

/// Receives redraw and health notifications from the sync layer.
///
/// Rendering, highlighting and "waiting" indicators live behind this trait;
/// the sync layer never draws anything itself.
pub trait Presenter {
    /// Called after every accepted snapshot.
    ///
    /// `winning_line` is empty unless the game is won.
    fn on_state_changed(&mut self, state: &GameState, winning_line: &[Coordinate]);

    /// Called when the replication channel fails.
    fn on_degraded(&mut self, _error: &ChannelError) {}
}

/// Presenter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_state_changed(&mut self, _state: &GameState, _winning_line: &[Coordinate]) {}
}
