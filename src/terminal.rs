//! Plain-text presenter for the demo binary.

use strictly_gomoku_sync::{ChannelError, Coordinate, GameState, Outcome, Presenter};

/// Prints every accepted snapshot for one named client.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    name: String,
}

impl TerminalPresenter {
    /// Creates a presenter labelled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Presenter for TerminalPresenter {
    fn on_state_changed(&mut self, state: &GameState, winning_line: &[Coordinate]) {
        print_state(&self.name, state, winning_line);
    }

    fn on_degraded(&mut self, error: &ChannelError) {
        eprintln!("[{}] multiplayer unavailable: {}", self.name, error.message);
    }
}

/// Renders a snapshot with a status line.
pub fn print_state(name: &str, state: &GameState, winning_line: &[Coordinate]) {
    let status = match state.outcome() {
        Outcome::InProgress => format!("{} to move", state.current_player()),
        outcome => outcome.to_string(),
    };
    println!("[{}] {}", name, status);
    println!("{}", state.board());
    if !winning_line.is_empty() {
        let cells: Vec<String> = winning_line.iter().map(ToString::to_string).collect();
        println!("winning line: {}", cells.join(" "));
    }
}
