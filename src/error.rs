//! Replication channel error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Replication channel failure with location tracking.
///
/// Raised when the property store cannot be reached for a publish,
/// subscribe or read. The sync layer turns this into a degraded-mode
/// signal instead of retrying.
#[derive(Debug, Clone, Display, Error)]
#[display("Channel error: {} at {}:{}", message, file, line)]
pub struct ChannelError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ChannelError {
    /// Creates a new channel error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
