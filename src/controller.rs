//! Input gating and reconciliation for one replicated match.
//!
//! A local move is never applied directly. The controller computes the
//! speculative next state, locks input, and publishes it. The state only
//! becomes authoritative when the channel delivers it back, at which point
//! input unlocks. Every delivered snapshot is accepted wholesale, so the last
//! delivered snapshot wins on every client.
//!
//! The lock stops one client from submitting twice before its first move is
//! confirmed. It is not mutual exclusion between clients: two unlocked
//! clients can publish competing snapshots built from the same prior state,
//! and whichever is delivered last silently replaces the other.

use crate::channel::{Change, ReplicationChannel};
use crate::error::ChannelError;
use crate::presenter::Presenter;
use derive_more::Display;
use strictly_gomoku::{Coordinate, Game, GameState, SnapshotError};
use tracing::{debug, error, info, instrument, warn};

/// How the controller handled a click or reset intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Disposition {
    /// State published; input is locked until the next delivery.
    #[display("published")]
    Published,
    /// The game is over; only reset is accepted.
    #[display("ignored: game over")]
    IgnoredTerminal,
    /// An earlier publish is still awaiting delivery.
    #[display("ignored: awaiting confirmation")]
    IgnoredLocked,
    /// The cell is occupied or off the board.
    #[display("ignored: illegal move")]
    IgnoredIllegal,
    /// The snapshot could not be handed to the channel.
    #[display("publish failed")]
    PublishFailed,
}

impl Disposition {
    /// Returns true when a snapshot was handed to the channel.
    pub fn is_published(self) -> bool {
        matches!(self, Disposition::Published)
    }
}

/// Synchronization controller for a single match key.
pub struct SyncController<C, P> {
    key: String,
    game: Game,
    channel: C,
    presenter: P,
    locked: bool,
    degraded: bool,
}

impl<C, P> std::fmt::Debug for SyncController<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("key", &self.key)
            .field("game", &self.game)
            .field("locked", &self.locked)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

impl<C: ReplicationChannel, P: Presenter> SyncController<C, P> {
    /// Creates a controller publishing under `key`.
    #[instrument(skip_all, fields(key = %key.as_ref()))]
    pub fn new(key: impl AsRef<str>, game: Game, channel: C, presenter: P) -> Self {
        info!(size = game.size(), "Creating sync controller");
        Self {
            key: key.as_ref().to_string(),
            game,
            channel,
            presenter,
            locked: false,
            degraded: false,
        }
    }

    /// Match key this controller publishes under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current authoritative state.
    pub fn state(&self) -> &GameState {
        self.game.state()
    }

    /// Winning line of the authoritative state, or an empty slice.
    pub fn winning_line(&self) -> &[Coordinate] {
        self.game.winning_cells()
    }

    /// True while a published snapshot awaits delivery.
    pub fn is_input_locked(&self) -> bool {
        self.locked
    }

    /// True after a channel failure, until the next successful exchange.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Returns the presentation collaborator.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Adopts whatever state is already stored under the key.
    ///
    /// Used when joining a match in progress. Returns true when a stored
    /// snapshot was imported. The lock is not touched.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn bootstrap(&mut self) -> bool {
        let stored = match self.channel.read_current(&self.key) {
            Ok(stored) => stored,
            Err(e) => {
                self.degrade(&e);
                return false;
            }
        };

        let Some(json) = stored else {
            debug!("No stored state; starting fresh");
            return false;
        };

        match self.apply(&json) {
            Ok(()) => {
                info!(outcome = %self.state().outcome(), "Adopted stored state");
                true
            }
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored state");
                false
            }
        }
    }

    /// Handles a click on cell `coord`.
    #[instrument(skip(self), fields(key = %self.key, row = coord.row, col = coord.col))]
    pub fn on_cell_clicked(&mut self, coord: Coordinate) -> Disposition {
        if self.state().outcome().is_terminal() {
            debug!("Click ignored: game over");
            return Disposition::IgnoredTerminal;
        }
        if self.locked {
            debug!("Click ignored: input locked");
            return Disposition::IgnoredLocked;
        }

        let Some(next) = self.game.speculate(coord) else {
            debug!("Click ignored: illegal move");
            return Disposition::IgnoredIllegal;
        };

        info!(outcome = %next.outcome(), "Locking input and publishing move");
        self.publish(&next)
    }

    /// Handles the reset intent.
    ///
    /// Overrides any in-flight move and is accepted even while locked.
    #[instrument(skip(self), fields(key = %self.key, locked = self.locked))]
    pub fn on_reset(&mut self) -> Disposition {
        self.game.reset();
        let snapshot = self.game.export();
        info!("Publishing reset");
        self.publish(&snapshot)
    }

    /// Applies a snapshot delivered by the channel.
    ///
    /// Echoes of this client's own publishes and peer updates are treated
    /// alike. A malformed snapshot is rejected and leaves both the state and
    /// the lock as they were.
    #[instrument(skip(self, json), fields(key = %self.key, len = json.len()))]
    pub fn on_remote_change_delivered(&mut self, json: &str) -> Result<(), SnapshotError> {
        if let Err(e) = self.apply(json) {
            warn!(error = %e, locked = self.locked, "Rejected malformed snapshot");
            return Err(e);
        }
        self.locked = false;
        self.degraded = false;
        debug!(outcome = %self.state().outcome(), "Applied delivered snapshot; input unlocked");
        Ok(())
    }

    /// Forwards a change notification if it belongs to this match.
    #[instrument(skip(self, change), fields(key = %self.key, change_key = %change.key))]
    pub fn on_change(&mut self, change: &Change) -> Result<(), SnapshotError> {
        if change.key != self.key {
            debug!("Ignoring change for another key");
            return Ok(());
        }
        self.on_remote_change_delivered(&change.value)
    }

    fn apply(&mut self, json: &str) -> Result<(), SnapshotError> {
        let snapshot = GameState::from_json_sized(json, self.game.size())?;
        self.game.import(snapshot)?;
        self.presenter
            .on_state_changed(self.game.state(), self.game.winning_cells());
        Ok(())
    }

    fn publish(&mut self, snapshot: &GameState) -> Disposition {
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to encode snapshot");
                return Disposition::PublishFailed;
            }
        };

        self.locked = true;
        match self.channel.publish(&self.key, &json) {
            Ok(()) => {
                self.degraded = false;
                Disposition::Published
            }
            Err(e) => {
                // Nothing is in flight, so no delivery will come to unlock us.
                self.locked = false;
                self.degrade(&e);
                Disposition::PublishFailed
            }
        }
    }

    pub(crate) fn degrade(&mut self, error: &ChannelError) {
        error!(error = %error, "Replication channel unavailable");
        self.degraded = true;
        self.presenter.on_degraded(error);
    }
}
