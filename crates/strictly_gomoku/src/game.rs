//! Authoritative game state machine for gomoku.

use crate::rules::{evaluate, is_full};
use crate::snapshot::SnapshotError;
use crate::types::{
    Board, BoardError, Cell, Coordinate, GameState, Outcome, Player, WinningLine,
};
use tracing::{debug, info, instrument, warn};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Gomoku game engine.
///
/// Owns the single authoritative [`GameState`] for a match. State changes
/// only by whole-snapshot replacement through [`Game::reset`] or
/// [`Game::import`]; [`Game::speculate`] is a pure projection.
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    winning_line: Option<WinningLine>,
}

impl Game {
    /// Creates a new game on an empty `size` x `size` board, Black to move.
    #[instrument]
    pub fn new(size: usize) -> Result<Self, BoardError> {
        let board = Board::new(size)?;
        Ok(Self {
            state: GameState::new(board, Player::Black, Outcome::InProgress, now_millis()),
            winning_line: None,
        })
    }

    /// Board dimension.
    pub fn size(&self) -> usize {
        self.state.board().size()
    }

    /// Returns the current authoritative state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The deciding five, when the game is won.
    pub fn winning_line(&self) -> Option<&WinningLine> {
        self.winning_line.as_ref()
    }

    /// Coordinates of the winning line, or an empty slice.
    pub fn winning_cells(&self) -> &[Coordinate] {
        self.winning_line
            .as_ref()
            .map(|line| line.cells())
            .unwrap_or(&[])
    }

    /// Replaces the state with an empty board, Black to move.
    #[instrument(skip(self), fields(size = self.size()))]
    pub fn reset(&mut self) {
        let board = self.state.board().cleared();
        self.state = GameState::new(board, Player::Black, Outcome::InProgress, now_millis());
        self.winning_line = None;
        info!("Game reset");
    }

    /// Computes the state that would follow a move at `coord`.
    ///
    /// Returns `None` when the game is over or the cell is occupied or off
    /// the board. Never touches the authoritative state.
    #[instrument(skip(self), fields(row = coord.row, col = coord.col))]
    pub fn speculate(&self, coord: Coordinate) -> Option<GameState> {
        if self.state.outcome().is_terminal() {
            debug!(outcome = %self.state.outcome(), "Game is already over");
            return None;
        }

        match self.state.board().get(coord) {
            Ok(Cell::Empty) => {}
            Ok(Cell::Occupied(owner)) => {
                debug!(%owner, "Cell is already occupied");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Ignoring move outside the board");
                return None;
            }
        }

        let player = self.state.current_player();
        let mut board = self.state.board().clone();
        board.set(coord, Cell::Occupied(player)).ok()?;

        let evaluation = evaluate(&board);
        let next_player = if evaluation.outcome.is_terminal() {
            player
        } else {
            player.opponent()
        };

        debug!(%player, outcome = %evaluation.outcome, "Speculated move");
        Some(GameState::new(
            board,
            next_player,
            evaluation.outcome,
            now_millis(),
        ))
    }

    /// Replaces the authoritative state with `snapshot`.
    ///
    /// The winning line is recomputed from the board. A full board declared
    /// in progress is treated as a draw. Snapshots for a different board
    /// size are rejected and leave the state untouched.
    #[instrument(
        skip(self, snapshot),
        fields(outcome = %snapshot.outcome(), last_modified = snapshot.last_modified())
    )]
    pub fn import(&mut self, snapshot: GameState) -> Result<(), SnapshotError> {
        let found = snapshot.board().size();
        if found != self.size() {
            warn!(expected = self.size(), found, "Rejecting snapshot with wrong dimension");
            return Err(SnapshotError::DimensionMismatch {
                expected: self.size(),
                found,
            });
        }

        let (outcome, winning_line) = match snapshot.outcome() {
            Outcome::Won(declared) => match evaluate(snapshot.board()).winning_line {
                Some(line) if line.player() == declared => {
                    (Outcome::Won(declared), Some(line))
                }
                Some(line) => {
                    warn!(
                        %declared,
                        found = %line.player(),
                        "Declared winner does not own the line on the board"
                    );
                    (Outcome::Won(declared), None)
                }
                None => {
                    warn!(%declared, "Declared winner has no five in a row on the board");
                    (Outcome::Won(declared), None)
                }
            },
            Outcome::InProgress if is_full(snapshot.board()) => {
                warn!("Snapshot declared in progress on a full board; treating as draw");
                (Outcome::Draw, None)
            }
            other => (other, None),
        };

        self.state = snapshot.with_outcome(outcome);
        self.winning_line = winning_line;
        debug!(%outcome, "Imported snapshot");
        Ok(())
    }

    /// Returns the current state stamped with the current time.
    #[instrument(skip(self))]
    pub fn export(&self) -> GameState {
        self.state.clone().with_last_modified(now_millis())
    }
}
