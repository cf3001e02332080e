//! Core domain types for gomoku.

use derive_more::Display;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Board dimension used when none is configured.
pub const DEFAULT_BOARD_SIZE: usize = 15;

/// Number of aligned stones that wins the game.
pub const WIN_LENGTH: usize = 5;

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Player {
    /// Black stones (moves first).
    Black,
    /// White stones.
    White,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Seat number used on the wire (1 for Black, 2 for White).
    pub fn seat(self) -> u8 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }

    /// Inverse of [`Player::seat`].
    pub fn from_seat(seat: u8) -> Option<Self> {
        match seat {
            1 => Some(Player::Black),
            2 => Some(Player::White),
            _ => None,
        }
    }

    /// Character used in text renderings of the board.
    pub fn symbol(self) -> char {
        match self {
            Player::Black => 'X',
            Player::White => 'O',
        }
    }
}

/// A single intersection on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// No stone.
    #[default]
    Empty,
    /// Stone owned by a player.
    Occupied(Player),
}

impl Cell {
    /// Returns true when no stone is present.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Wire value (0 empty, otherwise the player's seat).
    pub fn wire_value(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Occupied(player) => player.seat(),
        }
    }

    /// Inverse of [`Cell::wire_value`].
    pub fn from_wire_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Cell::Empty),
            seat => Player::from_seat(seat).map(Cell::Occupied),
        }
    }
}

/// Zero-based board coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, new,
)]
#[display("({}, {})", row, col)]
pub struct Coordinate {
    /// Row index, top to bottom.
    pub row: usize,
    /// Column index, left to right.
    pub col: usize,
}

impl From<(usize, usize)> for Coordinate {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Error raised by board construction or access.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardError {
    /// Board dimension was zero.
    #[display("Board size must be at least 1, got {}", _0)]
    InvalidSize(usize),

    /// Cell storage does not match the declared dimension.
    #[display("Expected {} cells for a {}x{} board, got {}", expected, size, size, found)]
    CellCount {
        /// Declared dimension.
        size: usize,
        /// `size * size`.
        expected: usize,
        /// Cells actually supplied.
        found: usize,
    },

    /// Coordinate lies outside the board.
    #[display("Coordinate {} is outside the {}x{} board", coord, size, size)]
    OutOfBounds {
        /// Offending coordinate.
        coord: Coordinate,
        /// Board dimension.
        size: usize,
    },
}

impl std::error::Error for BoardError {}

/// Square gomoku board stored in row-major order.
///
/// The dimension is fixed at construction; [`Clone`] yields an independent
/// copy, which is how speculative moves avoid touching authoritative state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty `size` x `size` board.
    #[instrument]
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// Builds a board from row-major cells.
    #[instrument(skip(cells), fields(found = cells.len()))]
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::InvalidSize(size));
        }
        let expected = size * size;
        if cells.len() != expected {
            return Err(BoardError::CellCount {
                size,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Returns an empty board with the same dimension.
    pub fn cleared(&self) -> Self {
        Self {
            size: self.size,
            cells: vec![Cell::Empty; self.cells.len()],
        }
    }

    /// Board dimension (rows and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true when the coordinate lies on the board.
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    fn index(&self, coord: Coordinate) -> Result<usize, BoardError> {
        if !self.contains(coord) {
            return Err(BoardError::OutOfBounds {
                coord,
                size: self.size,
            });
        }
        Ok(coord.row * self.size + coord.col)
    }

    /// Gets the cell at the given coordinate.
    pub fn get(&self, coord: Coordinate) -> Result<Cell, BoardError> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Sets the cell at the given coordinate.
    pub fn set(&mut self, coord: Coordinate, cell: Cell) -> Result<(), BoardError> {
        let idx = self.index(coord)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Checks if a cell is empty. Off-board coordinates are never empty.
    pub fn is_empty(&self, coord: Coordinate) -> bool {
        matches!(self.get(coord), Ok(Cell::Empty))
    }

    /// Returns true when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, row) in self.rows().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.'.to_string(),
                    Cell::Occupied(player) => player.symbol().to_string(),
                })
                .collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Result of the game so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Outcome {
    /// Moves are still legal.
    #[default]
    #[display("in progress")]
    InProgress,
    /// A player has five in a row.
    #[display("won by {}", _0)]
    Won(Player),
    /// The board is full without a winner.
    #[display("draw")]
    Draw,
}

impl Outcome {
    /// Returns true once no further moves are legal.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// The five stones that decided the game, in scan order.
///
/// Always derived from a board, never transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct WinningLine {
    player: Player,
    cells: [Coordinate; WIN_LENGTH],
}

impl WinningLine {
    /// Owner of the line.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Coordinates of the line.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }
}

/// Complete replicated game snapshot.
///
/// Serializes to the wire shape
/// `{"board":[[0,1,2,..],..],"currentPlayer":1,"winner":null,"lastModified":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "crate::snapshot::WireSnapshot",
    into = "crate::snapshot::WireSnapshot"
)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: Outcome,
    last_modified: i64,
}

impl GameState {
    /// Creates a snapshot from its parts.
    pub fn new(board: Board, current_player: Player, outcome: Outcome, last_modified: i64) -> Self {
        Self {
            board,
            current_player,
            outcome,
            last_modified,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move, or the winner once the game is won.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Milliseconds since the Unix epoch when this snapshot was produced.
    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// Compares board, turn and outcome, ignoring the timestamp.
    pub fn same_position(&self, other: &GameState) -> bool {
        self.board == other.board
            && self.current_player == other.current_player
            && self.outcome == other.outcome
    }

    pub(crate) fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub(crate) fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = last_modified;
        self
    }
}
