//! Win detection logic for gomoku.
//!
//! Cells are scanned in row-major order and runs are only extended forward.
//! Every run is first reached from its earliest cell in that order, so the
//! reported line is the same for identical boards on every client.

use crate::types::{Board, Cell, Coordinate, Player, WIN_LENGTH, WinningLine};
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, instrument};

/// Line directions, in the order they are tried from each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Direction {
    /// Row and column step for one cell in this direction.
    pub fn step(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }
}

fn offset(
    board: &Board,
    start: Coordinate,
    direction: Direction,
    distance: usize,
) -> Option<Coordinate> {
    let (dr, dc) = direction.step();
    let row = start.row as isize + dr * distance as isize;
    let col = start.col as isize + dc * distance as isize;
    if row < 0 || col < 0 {
        return None;
    }
    let coord = Coordinate::new(row as usize, col as usize);
    board.contains(coord).then_some(coord)
}

/// Collects `WIN_LENGTH` stones of `player` starting at `start`.
fn run_from(
    board: &Board,
    start: Coordinate,
    player: Player,
    direction: Direction,
) -> Option<[Coordinate; WIN_LENGTH]> {
    let mut cells = [start; WIN_LENGTH];
    for (distance, slot) in cells.iter_mut().enumerate().skip(1) {
        let next = offset(board, start, direction, distance)?;
        if board.get(next).ok()? != Cell::Occupied(player) {
            return None;
        }
        *slot = next;
    }
    Some(cells)
}

/// Finds the first five-in-a-row in scan order.
#[instrument(skip(board), fields(size = board.size()))]
pub fn find_winning_line(board: &Board) -> Option<WinningLine> {
    for row in 0..board.size() {
        for col in 0..board.size() {
            let start = Coordinate::new(row, col);
            let Ok(Cell::Occupied(player)) = board.get(start) else {
                continue;
            };
            for direction in Direction::iter() {
                if let Some(cells) = run_from(board, start, player, direction) {
                    debug!(%start, ?direction, %player, "Found winning line");
                    return Some(WinningLine::new(player, cells));
                }
            }
        }
    }
    None
}

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has five in a row,
/// `None` otherwise.
#[instrument(skip(board), fields(size = board.size()))]
pub fn check_winner(board: &Board) -> Option<Player> {
    find_winning_line(board).map(|line| line.player())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, player: Player, coords: &[(usize, usize)]) {
        for &(row, col) in coords {
            board
                .set(Coordinate::new(row, col), Cell::Occupied(player))
                .unwrap();
        }
    }

    fn coords(cells: &[(usize, usize)]) -> Vec<Coordinate> {
        cells.iter().copied().map(Coordinate::from).collect()
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new(15).unwrap();
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_no_winner_four_in_a_row() {
        let mut board = Board::new(15).unwrap();
        place(&mut board, Player::Black, &[(7, 3), (7, 4), (7, 5), (7, 6)]);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_winner_horizontal() {
        let mut board = Board::new(15).unwrap();
        let row = [(7, 3), (7, 4), (7, 5), (7, 6), (7, 7)];
        place(&mut board, Player::Black, &row);
        let line = find_winning_line(&board).unwrap();
        assert_eq!(line.player(), Player::Black);
        assert_eq!(line.cells(), coords(&row).as_slice());
    }

    #[test]
    fn test_winner_vertical() {
        let mut board = Board::new(15).unwrap();
        let column = [(10, 14), (11, 14), (12, 14), (13, 14), (14, 14)];
        place(&mut board, Player::White, &column);
        let line = find_winning_line(&board).unwrap();
        assert_eq!(line.player(), Player::White);
        assert_eq!(line.cells(), coords(&column).as_slice());
    }

    #[test]
    fn test_winner_anti_diagonal_reported_from_top_right() {
        let mut board = Board::new(15).unwrap();
        // Placed bottom-up; the line is still reported from its earliest cell.
        let diagonal = [(6, 0), (5, 1), (4, 2), (3, 3), (2, 4)];
        place(&mut board, Player::White, &diagonal);
        let line = find_winning_line(&board).unwrap();
        assert_eq!(
            line.cells(),
            coords(&[(2, 4), (3, 3), (4, 2), (5, 1), (6, 0)]).as_slice()
        );
    }

    #[test]
    fn test_six_in_a_row_reports_first_five() {
        let mut board = Board::new(15).unwrap();
        place(
            &mut board,
            Player::Black,
            &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (5, 5)],
        );
        let line = find_winning_line(&board).unwrap();
        assert_eq!(line.cells()[0], Coordinate::new(0, 0));
        assert_eq!(line.cells()[4], Coordinate::new(4, 4));
    }

    #[test]
    fn test_line_does_not_wrap_rows() {
        let mut board = Board::new(6).unwrap();
        place(
            &mut board,
            Player::Black,
            &[(0, 3), (0, 4), (0, 5), (1, 0), (1, 1)],
        );
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_earliest_line_wins_scan() {
        let mut board = Board::new(15).unwrap();
        place(&mut board, Player::White, &[(9, 0), (9, 1), (9, 2), (9, 3), (9, 4)]);
        place(&mut board, Player::Black, &[(2, 5), (3, 5), (4, 5), (5, 5), (6, 5)]);
        assert_eq!(check_winner(&board), Some(Player::Black));
    }
}
