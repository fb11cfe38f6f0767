//! Tick failure taxonomy and the reporting hook for skipped ticks.

use thiserror::Error;
use tracing::warn;

/// Why a tick was skipped. Neither variant is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Endpoint unreachable, timed out, or answered with a non-success status.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Payload did not match the expected schema.
    #[error("invalid shape at {path}: {reason}")]
    InvalidShape { path: String, reason: String },
}

impl SyncError {
    pub fn invalid_shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Transport(_) => "transport",
            SyncError::InvalidShape { .. } => "invalid_shape",
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Transport(e.to_string())
    }
}

/// Receives non-fatal diagnostics for skipped ticks.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, err: &SyncError);
}

/// Default reporter: one `warn` event per skipped tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, err: &SyncError) {
        warn!(kind = err.kind(), error = %err, "tick skipped; keeping last published model");
    }
}
