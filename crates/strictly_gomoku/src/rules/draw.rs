//! Draw detection logic for gomoku.

use super::win::check_winner;
use crate::types::Board;
use tracing::instrument;

/// Checks if the board is full (every cell occupied).
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// A full board with no five-in-a-row.
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && check_winner(board).is_none()
}
