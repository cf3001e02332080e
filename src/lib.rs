//! Strictly Gomoku Sync - gomoku replicated through a property store
//!
//! Two clients play one match whose authoritative state lives in a shared
//! last-write-wins key/value store. Each client predicts its own move,
//! locks input, publishes the whole snapshot, and unlocks when the store
//! delivers a snapshot back.
//!
//! # Architecture
//!
//! - **Channel**: publish/subscribe/read over the property store
//! - **Controller**: input lock and reconciliation for one match
//! - **Session**: one controller per match key
//! - **Config**: instance name, board size and key prefix
//!
//! # Example
//!
//! ```
//! use strictly_gomoku_sync::{InMemoryChannel, NullPresenter, SessionManager};
//!
//! let channel = InMemoryChannel::new();
//! let mut black = SessionManager::new(channel.clone());
//! let mut white = SessionManager::new(channel);
//!
//! black.open("gomoku_game_demo", 15, NullPresenter).unwrap();
//! white.open("gomoku_game_demo", 15, NullPresenter).unwrap();
//!
//! let session = black.get_mut("gomoku_game_demo").unwrap();
//! assert!(session.report_cell_activated(7, 7).is_published());
//! assert!(session.controller().is_input_locked());
//!
//! black.pump_all();
//! white.pump_all();
//! let session = white.get("gomoku_game_demo").unwrap();
//! assert_eq!(session.controller().state().board().stone_count(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod channel;
mod config;
mod controller;
mod error;
mod presenter;
mod session;

// Crate-level exports - Replication channel
pub use channel::{
    Change, InMemoryChannel, ReplicationChannel, Subscription, SubscriptionSender,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, SyncConfig};

// Crate-level exports - Synchronization
pub use controller::{Disposition, SyncController};
pub use error::ChannelError;
pub use presenter::{NullPresenter, Presenter};

// Crate-level exports - Session management
pub use session::{MatchSession, SessionError, SessionManager};

// Crate-level exports - Game types
pub use strictly_gomoku::{
    Board, Cell, Coordinate, Game, GameState, Outcome, Player, SnapshotError, WinningLine,
};
