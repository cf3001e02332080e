//! Strictly Gomoku - pure game logic for five-in-a-row
//!
//! Board model, win/draw evaluation, the authoritative game state machine
//! and the JSON snapshot format shared by every replica of a match.
//!
//! # Example
//!
//! ```
//! use strictly_gomoku::{Coordinate, Game, Player};
//!
//! let mut game = Game::new(15).unwrap();
//! let next = game.speculate(Coordinate::new(7, 7)).unwrap();
//! assert_eq!(next.current_player(), Player::White);
//!
//! // Nothing changes until the snapshot is imported.
//! assert_eq!(game.state().board().stone_count(), 0);
//! game.import(next).unwrap();
//! assert_eq!(game.state().board().stone_count(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod game;
mod snapshot;
mod types;

pub mod rules;

// Crate-level exports - State machine
pub use game::{Game, now_millis};

// Crate-level exports - Rules
pub use rules::{Evaluation, evaluate};

// Crate-level exports - Wire format
pub use snapshot::SnapshotError;

// Crate-level exports - Domain types
pub use types::{
    Board, BoardError, Cell, Coordinate, DEFAULT_BOARD_SIZE, GameState, Outcome, Player,
    WIN_LENGTH, WinningLine,
};
