// Session error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Session error code constants
///
/// Error code range: 2001-2002
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Lane group outside the configured spawn locations
    pub const LANE_GROUP_OUT_OF_RANGE: i32 = 2001;

    /// Input direction sign was neither +1 nor -1
    pub const INVALID_DIRECTION: i32 = 2002;
}

/// Log a session error with structured context
///
/// Session errors never abort a tick; the offending event is skipped and
/// the error is logged here and handed back to the caller.
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=GameSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors surfaced while a session is running
///
/// Error code range: 2001-2002
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A note event or input referenced a lane group that does not exist
    LaneGroupOutOfRange {
        lane_group: usize,
        spawn_locations: usize,
        beat_stamp: Option<f64>,
    },

    /// Input direction sign was not +1 or -1
    InvalidDirection { sign: i32 },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::LaneGroupOutOfRange { .. } => {
                SessionErrorCodes::LANE_GROUP_OUT_OF_RANGE
            }
            SessionError::InvalidDirection { .. } => SessionErrorCodes::INVALID_DIRECTION,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::LaneGroupOutOfRange {
                lane_group,
                spawn_locations,
                beat_stamp: Some(beat),
            } => format!(
                "Note at beat {} uses lane group {} but only {} spawn locations exist; skipped",
                beat, lane_group, spawn_locations
            ),
            SessionError::LaneGroupOutOfRange {
                lane_group,
                spawn_locations,
                beat_stamp: None,
            } => format!(
                "Lane group {} out of range (spawn locations: {})",
                lane_group, spawn_locations
            ),
            SessionError::InvalidDirection { sign } => {
                format!("Direction sign must be +1 or -1 (got {})", sign)
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}
