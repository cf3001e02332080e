//! Strictly Gomoku Sync - Unified CLI
//!
//! Runs two clients against one in-memory property store so the
//! synchronization protocol can be exercised from a terminal.

#![warn(missing_docs)]

mod cli;
mod terminal;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use std::io::{BufRead, Write};
use strictly_gomoku_sync::{Disposition, InMemoryChannel, SessionManager, SyncConfig};
use terminal::TerminalPresenter;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

type Client = SessionManager<InMemoryChannel, TerminalPresenter>;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    info!(key = %config.match_key(), board_size = config.board_size(), "Match configured");

    match cli.command {
        Command::Play { manual_sync } => run_play(&config, manual_sync),
        Command::Race => run_race(&config),
    }
}

/// Builds the match config from the optional file plus CLI overrides.
#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::from_file(path)?,
        None => SyncConfig::default(),
    };
    if let Some(instance) = &cli.instance {
        config = config.with_instance(instance.clone());
    }
    if let Some(board_size) = cli.board_size {
        config = config.with_board_size(board_size);
    }
    Ok(config.normalized())
}

/// Opens the match on two clients named `alice` and `bob`.
fn open_clients(config: &SyncConfig) -> Result<(Client, Client)> {
    let channel = InMemoryChannel::new();
    let mut alice = SessionManager::new(channel.clone());
    let mut bob = SessionManager::new(channel);
    alice
        .open_from_config(config, TerminalPresenter::new("alice"))
        .context("alice could not join the match")?;
    bob.open_from_config(config, TerminalPresenter::new("bob"))
        .context("bob could not join the match")?;
    Ok((alice, bob))
}

fn client_named<'a>(
    name: &str,
    alice: &'a mut Client,
    bob: &'a mut Client,
) -> Result<&'a mut Client> {
    match name {
        "a" | "alice" => Ok(alice),
        "b" | "bob" => Ok(bob),
        other => bail!("unknown client '{}', expected a or b", other),
    }
}

fn parse_coordinate(row: &str, col: &str) -> Result<(usize, usize)> {
    let row = row.parse::<usize>().with_context(|| format!("bad row '{}'", row))?;
    let col = col.parse::<usize>().with_context(|| format!("bad column '{}'", col))?;
    Ok((row, col))
}

fn report(name: &str, disposition: Disposition) {
    println!("[{}] {}", name, disposition);
}

/// Interactive two-client session.
#[instrument(skip(config))]
fn run_play(config: &SyncConfig, manual_sync: bool) -> Result<()> {
    let key = config.match_key();
    let (mut alice, mut bob) = open_clients(config)?;

    println!("Match '{}' on a {}x{} board.", key, config.board_size(), config.board_size());
    println!("Commands: a|b <row> <col>, reset a|b, sync, show, quit");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();

        let result = match words.as_slice() {
            [] => Ok(()),
            ["quit"] | ["exit"] => break,
            ["sync"] => {
                let applied = alice.pump_all() + bob.pump_all();
                println!("delivered {} snapshot(s)", applied);
                Ok(())
            }
            ["show"] => {
                for (name, client) in [("alice", &alice), ("bob", &bob)] {
                    if let Some(session) = client.get(&key) {
                        terminal::print_state(
                            name,
                            session.controller().state(),
                            session.controller().winning_line(),
                        );
                        println!("locked: {}", session.controller().is_input_locked());
                    }
                }
                Ok(())
            }
            ["reset", who] => client_named(who, &mut alice, &mut bob).and_then(|client| {
                let session = client.get_mut(&key).context("session closed")?;
                report(who, session.report_reset_activated());
                Ok(())
            }),
            [who, row, col] => parse_coordinate(row, col).and_then(|(row, col)| {
                let client = client_named(who, &mut alice, &mut bob)?;
                let session = client.get_mut(&key).context("session closed")?;
                report(who, session.report_cell_activated(row, col));
                Ok(())
            }),
            _ => Err(anyhow::anyhow!("unrecognised command")),
        };

        if let Err(e) = result {
            println!("error: {}", e);
            continue;
        }
        if !manual_sync {
            alice.pump_all();
            bob.pump_all();
        }
    }

    Ok(())
}

/// Scripted demonstration of the cross-client race.
#[instrument(skip(config))]
fn run_race(config: &SyncConfig) -> Result<()> {
    let key = config.match_key();
    let (mut alice, mut bob) = open_clients(config)?;

    println!("Both clients are unlocked and see an empty board.");
    let first = alice
        .get_mut(&key)
        .context("alice session missing")?
        .report_cell_activated(0, 0);
    report("alice", first);
    let second = bob
        .get_mut(&key)
        .context("bob session missing")?
        .report_cell_activated(0, 1);
    report("bob", second);

    println!("Delivering both snapshots in publish order...");
    alice.pump_all();
    bob.pump_all();

    println!("Last delivered snapshot wins: alice's move at (0, 0) is gone on both clients.");
    Ok(())
}
