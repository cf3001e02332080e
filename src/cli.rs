//! Command-line interface for strictly_gomoku_sync.

use clap::{Parser, Subcommand};

/// Strictly Gomoku - five-in-a-row replicated through a shared property store
#[derive(Parser, Debug)]
#[command(name = "strictly_gomoku_sync")]
#[command(
    about = "Two gomoku clients kept in sync through a last-write-wins store",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML match config
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Override the match instance name
    #[arg(long, global = true)]
    pub instance: Option<String>,

    /// Override the board size
    #[arg(long, global = true)]
    pub board_size: Option<usize>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive two clients sharing one in-memory store from stdin
    Play {
        /// Deliver published snapshots only on `sync` instead of after every command
        #[arg(long)]
        manual_sync: bool,
    },

    /// Show two clients racing for the same turn
    Race,
}
