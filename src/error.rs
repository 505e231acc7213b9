//! Unified error handling for the activity-tracker library.
//!
//! The tracking engine performs no I/O, so its error surface is small:
//! the only caller-visible failure is starting a session while one is
//! already running. Numeric edge cases (zero distance, zero duration)
//! degrade to zero-valued statistics rather than erroring.

use std::fmt;

/// Unified error type for tracking operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// `start()` was invoked while a session is already active.
    /// The existing session is left untouched.
    AlreadyTracking {
        /// When the active session began (milliseconds since epoch).
        started_at_ms: i64,
    },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::AlreadyTracking { started_at_ms } => {
                write!(
                    f,
                    "A tracking session is already active (started at {} ms)",
                    started_at_ms
                )
            }
        }
    }
}

impl std::error::Error for TrackError {}

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, TrackError>;
