//! Error types for the replay engine.

use thiserror::Error;

/// Result type for replay engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or serving a replay.
///
/// Missing telemetry for a driver or instant is not an error: the
/// interpolator returns `None` and the car is left out of the frame.
#[derive(Debug, Error)]
pub enum Error {
    /// The archived session does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The telemetry store failed to read a record
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The viewer's connection failed or went away
    #[error("Transport error: {0}")]
    Transport(String),

    /// Too many replays are already running
    #[error("Replay capacity exceeded ({limit} concurrent replays)")]
    CapacityExceeded { limit: usize },

    /// Unrecoverable fault inside the engine
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Message shown to a viewer when their replay cannot start.
    pub fn viewer_message(&self) -> String {
        match self {
            Error::NotFound(_) => "Session not found".to_string(),
            Error::CapacityExceeded { .. } => "Too many concurrent replays".to_string(),
            _ => "Replay unavailable".to_string(),
        }
    }
}
