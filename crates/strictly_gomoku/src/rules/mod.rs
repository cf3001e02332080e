//! Game rules for gomoku.
//!
//! Pure functions that evaluate a board. Rules are kept apart from board
//! storage so the state machine can re-derive verdicts from any snapshot,
//! including ones received from a peer.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{Direction, check_winner, find_winning_line};

use crate::types::{Board, Outcome, WinningLine};
use tracing::instrument;

/// Verdict for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Terminal status of the board.
    pub outcome: Outcome,
    /// The deciding five, present only for [`Outcome::Won`].
    pub winning_line: Option<WinningLine>,
}

/// Evaluates a board.
///
/// A five-in-a-row beats a full board, so a board whose last empty cell
/// completes a line is a win rather than a draw.
#[instrument(skip(board), fields(size = board.size()))]
pub fn evaluate(board: &Board) -> Evaluation {
    if let Some(line) = find_winning_line(board) {
        return Evaluation {
            outcome: Outcome::Won(line.player()),
            winning_line: Some(line),
        };
    }

    let outcome = if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    };
    Evaluation {
        outcome,
        winning_line: None,
    }
}
