//! Wire format for replicated game snapshots.
//!
//! Every participant must encode and decode the same JSON shape:
//!
//! ```text
//! { "board": [[0|1|2, ...], ...],
//!   "currentPlayer": 1|2,
//!   "winner": null|1|2|"draw",
//!   "lastModified": <integer ms epoch> }
//! ```
//!
//! The winning line is presentation data and is never part of the snapshot.

use crate::types::{Board, BoardError, Cell, GameState, Outcome, Player};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const DRAW_LABEL: &str = "draw";

/// A snapshot that could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SnapshotError {
    /// Payload is not JSON of the expected shape.
    #[display("Snapshot could not be decoded: {}", _0)]
    Decode(String),

    /// Snapshot could not be encoded.
    #[display("Snapshot could not be encoded: {}", _0)]
    Encode(String),

    /// Board has no rows.
    #[display("Snapshot board has no rows")]
    EmptyBoard,

    /// A row length differs from the number of rows.
    #[display("Snapshot row {} has {} cells, expected {}", row, found, expected)]
    RaggedRow {
        /// Row index.
        row: usize,
        /// Cells in that row.
        found: usize,
        /// Number of rows.
        expected: usize,
    },

    /// Board is square but not the size this match is played on.
    #[display("Snapshot board is {}x{}, expected {}x{}", found, found, expected, expected)]
    DimensionMismatch {
        /// Size this match is played on.
        expected: usize,
        /// Size carried by the snapshot.
        found: usize,
    },

    /// Cell value outside 0..=2.
    #[display("Unknown cell value {} at ({}, {})", value, row, col)]
    InvalidCell {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// Offending value.
        value: u8,
    },

    /// `currentPlayer` outside 1..=2.
    #[display("Unknown player value {}", _0)]
    InvalidPlayer(u8),

    /// `winner` is neither null, a seat, nor `"draw"`.
    #[display("Unknown winner value {}", _0)]
    InvalidWinner(String),

    /// Board could not be constructed.
    #[display("{}", _0)]
    Board(BoardError),
}

impl std::error::Error for SnapshotError {}

impl From<BoardError> for SnapshotError {
    fn from(err: BoardError) -> Self {
        SnapshotError::Board(err)
    }
}

/// JSON shape of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSnapshot {
    board: Vec<Vec<u8>>,
    current_player: u8,
    winner: Option<WireWinner>,
    last_modified: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireWinner {
    Seat(u8),
    Label(String),
}

impl WireWinner {
    fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::InProgress => None,
            Outcome::Won(player) => Some(WireWinner::Seat(player.seat())),
            Outcome::Draw => Some(WireWinner::Label(DRAW_LABEL.to_string())),
        }
    }

    fn into_outcome(winner: Option<Self>) -> Result<Outcome, SnapshotError> {
        match winner {
            None => Ok(Outcome::InProgress),
            Some(WireWinner::Seat(seat)) => Player::from_seat(seat)
                .map(Outcome::Won)
                .ok_or_else(|| SnapshotError::InvalidWinner(seat.to_string())),
            Some(WireWinner::Label(label)) if label == DRAW_LABEL => Ok(Outcome::Draw),
            Some(WireWinner::Label(label)) => Err(SnapshotError::InvalidWinner(label)),
        }
    }
}

impl From<GameState> for WireSnapshot {
    fn from(state: GameState) -> Self {
        Self {
            board: state
                .board()
                .rows()
                .map(|row| row.iter().map(|cell| cell.wire_value()).collect())
                .collect(),
            current_player: state.current_player().seat(),
            winner: WireWinner::from_outcome(state.outcome()),
            last_modified: state.last_modified(),
        }
    }
}

impl TryFrom<WireSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(wire: WireSnapshot) -> Result<Self, Self::Error> {
        let size = wire.board.len();
        if size == 0 {
            return Err(SnapshotError::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in wire.board.iter().enumerate() {
            if values.len() != size {
                return Err(SnapshotError::RaggedRow {
                    row,
                    found: values.len(),
                    expected: size,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                let cell = Cell::from_wire_value(value)
                    .ok_or(SnapshotError::InvalidCell { row, col, value })?;
                cells.push(cell);
            }
        }

        let board = Board::from_cells(size, cells)?;
        let current_player = Player::from_seat(wire.current_player)
            .ok_or(SnapshotError::InvalidPlayer(wire.current_player))?;
        let outcome = WireWinner::into_outcome(wire.winner)?;

        Ok(GameState::new(board, current_player, outcome, wire.last_modified))
    }
}

impl GameState {
    /// Encodes the snapshot as wire JSON.
    #[instrument(skip(self), fields(outcome = %self.outcome()))]
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(&WireSnapshot::from(self.clone()))
            .map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decodes wire JSON of any square size.
    #[instrument(skip(json), fields(len = json.len()))]
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let wire: WireSnapshot =
            serde_json::from_str(json).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        GameState::try_from(wire)
    }

    /// Decodes wire JSON and requires a `size` x `size` board.
    #[instrument(skip(json), fields(len = json.len()))]
    pub fn from_json_sized(json: &str, size: usize) -> Result<Self, SnapshotError> {
        let state = Self::from_json(json)?;
        let found = state.board().size();
        if found != size {
            return Err(SnapshotError::DimensionMismatch {
                expected: size,
                found,
            });
        }
        Ok(state)
    }
}
