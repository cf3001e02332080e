//! Match configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_gomoku::DEFAULT_BOARD_SIZE;
use tracing::{debug, info, instrument, warn};

/// Configuration for one replicated match.
///
/// ```toml
/// instance = "lobby-3"
/// board_size = 15
/// key_prefix = "gomoku_game_"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct SyncConfig {
    /// Match instance name; scopes the replication key.
    #[serde(default = "default_instance")]
    instance: String,

    /// Board dimension. Zero falls back to the default.
    #[serde(default = "default_board_size")]
    board_size: usize,

    /// Prefix prepended to the instance to form the replication key.
    #[serde(default = "default_key_prefix")]
    key_prefix: String,
}

#[instrument]
fn default_instance() -> String {
    "local".to_string()
}

#[instrument]
fn default_board_size() -> usize {
    DEFAULT_BOARD_SIZE
}

#[instrument]
fn default_key_prefix() -> String {
    "gomoku_game_".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            instance: default_instance(),
            board_size: default_board_size(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl SyncConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Cannot read match config {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml(&content)?;
        info!(
            instance = %config.instance,
            board_size = config.board_size,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ConfigError::new(format!("Invalid match config: {}", e))
        })?;
        Ok(config.normalized())
    }

    /// Replaces a zero board size with the default.
    #[instrument(skip(self), fields(board_size = self.board_size))]
    pub fn normalized(mut self) -> Self {
        if self.board_size == 0 {
            warn!(fallback = DEFAULT_BOARD_SIZE, "Board size 0 is invalid; using default");
            self.board_size = DEFAULT_BOARD_SIZE;
        }
        self
    }

    /// Replication key for this match.
    pub fn match_key(&self) -> String {
        format!("{}{}", self.key_prefix, self.instance)
    }
}

/// Failure to load a match config, with the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Match config error: {} ({}:{})", message, file, line)]
pub struct ConfigError {
    /// What went wrong.
    pub message: String,
    /// Line that raised the error.
    pub line: u32,
    /// File that raised the error.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a config error tagged with the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
