//! Match session management.
//!
//! A client may follow several matches at once. Each match key gets its own
//! state machine, controller and subscription; nothing is shared between
//! them except the channel.

use crate::channel::{ReplicationChannel, Subscription};
use crate::config::SyncConfig;
use crate::controller::{Disposition, SyncController};
use crate::error::ChannelError;
use crate::presenter::Presenter;
use derive_more::Display;
use std::collections::HashMap;
use strictly_gomoku::{BoardError, Coordinate, Game};
use tracing::{debug, info, instrument, warn};

/// Error opening a match session.
#[derive(Debug, Clone, Display)]
pub enum SessionError {
    /// A session for the key is already open.
    #[display("Session '{}' already exists", _0)]
    AlreadyExists(String),

    /// The configured board size is invalid.
    #[display("Invalid board: {}", _0)]
    Board(BoardError),

    /// The channel refused the subscription.
    #[display("{}", _0)]
    Channel(ChannelError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::AlreadyExists(_) => None,
            SessionError::Board(e) => Some(e),
            SessionError::Channel(e) => Some(e),
        }
    }
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        SessionError::Board(err)
    }
}

impl From<ChannelError> for SessionError {
    fn from(err: ChannelError) -> Self {
        SessionError::Channel(err)
    }
}

/// One match as seen by this client.
#[derive(Debug)]
pub struct MatchSession<C, P> {
    controller: SyncController<C, P>,
    subscription: Subscription,
}

impl<C: ReplicationChannel, P: Presenter> MatchSession<C, P> {
    /// Match key.
    pub fn key(&self) -> &str {
        self.controller.key()
    }

    /// Returns the controller.
    pub fn controller(&self) -> &SyncController<C, P> {
        &self.controller
    }

    /// Forwards a cell activation from the presentation layer.
    #[instrument(skip(self), fields(key = %self.key()))]
    pub fn report_cell_activated(&mut self, row: usize, col: usize) -> Disposition {
        self.controller.on_cell_clicked(Coordinate::new(row, col))
    }

    /// Forwards a reset activation from the presentation layer.
    #[instrument(skip(self), fields(key = %self.key()))]
    pub fn report_reset_activated(&mut self) -> Disposition {
        self.controller.on_reset()
    }

    /// Feeds queued changes to the controller in delivery order.
    ///
    /// Returns the number of snapshots applied. Malformed ones are logged
    /// and skipped.
    #[instrument(skip(self), fields(key = %self.key(), pending = self.subscription.pending()))]
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(change) = self.subscription.next_change() {
            match self.controller.on_change(&change) {
                Ok(()) => applied += 1,
                Err(e) => warn!(error = %e, "Skipping undeliverable change"),
            }
        }
        debug!(applied, "Pumped changes");
        applied
    }
}

/// Manages all match sessions for one client.
#[derive(Debug)]
pub struct SessionManager<C, P> {
    channel: C,
    sessions: HashMap<String, MatchSession<C, P>>,
}

impl<C: ReplicationChannel + Clone, P: Presenter> SessionManager<C, P> {
    /// Creates a session manager on top of `channel`.
    #[instrument(skip(channel))]
    pub fn new(channel: C) -> Self {
        info!("Creating session manager");
        Self {
            channel,
            sessions: HashMap::new(),
        }
    }

    /// Opens a session for `key` on a `board_size` board.
    ///
    /// Subscribes before reading the stored state so no change published
    /// in between is missed. A refused subscription is reported to the
    /// presenter as degraded mode before the error is returned.
    #[instrument(skip(self, presenter))]
    pub fn open(
        &mut self,
        key: &str,
        board_size: usize,
        presenter: P,
    ) -> Result<&mut MatchSession<C, P>, SessionError> {
        if self.sessions.contains_key(key) {
            warn!("Session already exists");
            return Err(SessionError::AlreadyExists(key.to_string()));
        }

        let game = Game::new(board_size)?;
        let mut controller = SyncController::new(key, game, self.channel.clone(), presenter);
        let subscription = match self.channel.subscribe(key) {
            Ok(subscription) => subscription,
            Err(e) => {
                controller.degrade(&e);
                return Err(e.into());
            }
        };
        controller.bootstrap();

        info!("Opened session");
        Ok(self
            .sessions
            .entry(key.to_string())
            .or_insert(MatchSession {
                controller,
                subscription,
            }))
    }

    /// Opens the session described by `config`.
    #[instrument(skip(self, config, presenter), fields(key = %config.match_key()))]
    pub fn open_from_config(
        &mut self,
        config: &SyncConfig,
        presenter: P,
    ) -> Result<&mut MatchSession<C, P>, SessionError> {
        self.open(&config.match_key(), *config.board_size(), presenter)
    }

    /// Gets a session by key.
    pub fn get(&self, key: &str) -> Option<&MatchSession<C, P>> {
        self.sessions.get(key)
    }

    /// Gets a session by key, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut MatchSession<C, P>> {
        let session = self.sessions.get_mut(key);
        if session.is_none() {
            debug!(key, "Session not found");
        }
        session
    }

    /// Closes a session, dropping its subscription.
    #[instrument(skip(self))]
    pub fn close(&mut self, key: &str) -> Option<MatchSession<C, P>> {
        let removed = self.sessions.remove(key);
        if removed.is_some() {
            info!("Closed session");
        }
        removed
    }

    /// Lists open session keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.sessions.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true when no session is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Pumps every session. Returns the total number of snapshots applied.
    #[instrument(skip(self), fields(sessions = self.sessions.len()))]
    pub fn pump_all(&mut self) -> usize {
        self.sessions.values_mut().map(MatchSession::pump).sum()
    }
}
