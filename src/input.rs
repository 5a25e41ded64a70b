// Input mapping - player/autoplay answers addressed to a lane group

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Up/down answer to the active gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Answers `true`
    Up,
    /// Answers `false`
    Down,
}

impl Direction {
    /// Map a direction sign (`+1` up, `-1` down)
    pub fn from_sign(sign: i32) -> Result<Self, SessionError> {
        match sign {
            1 => Ok(Direction::Up),
            -1 => Ok(Direction::Down),
            other => Err(SessionError::InvalidDirection { sign: other }),
        }
    }

    /// Direction that answers `truth`
    pub fn from_truth(truth: bool) -> Self {
        if truth {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_bool(self) -> bool {
        matches!(self, Direction::Up)
    }
}

/// Timestamped answer for the oldest pending beat of a lane group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub lane_group: usize,
    pub direction: Direction,
    /// Song time of the input (seconds)
    pub timestamp: f64,
}

impl PlayerInput {
    pub fn new(lane_group: usize, direction: Direction, timestamp: f64) -> Self {
        Self {
            lane_group,
            direction,
            timestamp,
        }
    }

    /// Build an input from a raw direction sign
    pub fn from_sign(lane_group: usize, sign: i32, timestamp: f64) -> Result<Self, SessionError> {
        Ok(Self::new(lane_group, Direction::from_sign(sign)?, timestamp))
    }
}
