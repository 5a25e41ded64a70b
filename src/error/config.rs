// Configuration error types and constants

use crate::error::ErrorCode;
use crate::gate::GateVariant;
use log::error;
use std::fmt;

/// Configuration error code constants
///
/// Single source of truth for the codes reported by [`ConfigError`].
///
/// Error code range: 1001-1014
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// BPM value is invalid (must be finite and > 0)
    pub const BPM_INVALID: i32 = 1001;

    /// Lane count is zero
    pub const NO_LANES: i32 = 1002;

    /// Spawn location count is zero
    pub const NO_SPAWN_LOCATIONS: i32 = 1003;

    /// Judgment tier list is empty
    pub const EMPTY_TIER_LIST: i32 = 1004;

    /// A tier window width is negative or not finite
    pub const INVALID_TIER_WIDTH: i32 = 1005;

    /// A judgment appears twice, or Miss appears in the hit tier list
    pub const INVALID_TIER_SET: i32 = 1006;

    /// Allowed gate set is empty
    pub const EMPTY_GATE_SET: i32 = 1007;

    /// Initial gate is not part of the allowed set
    pub const GATE_NOT_ALLOWED: i32 = 1008;

    /// Travel distance/speed do not produce a usable lead time
    pub const INVALID_LEAD_TIME: i32 = 1009;

    /// Combo multiplier parameters are out of range
    pub const INVALID_COMBO: i32 = 1010;

    /// Maximum score is negative or not finite
    pub const INVALID_MAX_SCORE: i32 = 1011;

    /// JSON could not be parsed
    pub const PARSE_FAILED: i32 = 1012;

    /// File could not be read
    pub const IO_FAILED: i32 = 1013;

    /// A beatmap event has a NaN or infinite beat stamp
    pub const INVALID_BEAT_STAMP: i32 = 1014;
}

/// Log a configuration error with structured context
pub fn log_config_error(err: &ConfigError, context: &str) {
    error!(
        "Config error in {}: code={}, component=SessionConfig, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Configuration errors
///
/// Raised while validating a session configuration or beatmap before a
/// session starts. A session is never built from input that produced one
/// of these.
///
/// Error code range: 1001-1014
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// BPM value is invalid
    BpmInvalid { bpm: f64 },

    /// Zero lanes configured
    NoLanes,

    /// Zero spawn locations configured
    NoSpawnLocations,

    /// No hit tiers configured
    EmptyTierList,

    /// Tier window width is negative or not finite
    InvalidTierWidth { index: usize, width: f64 },

    /// Duplicate judgment, or Miss used as a hit tier
    InvalidTierSet { reason: String },

    /// No gates allowed
    EmptyGateSet,

    /// Initial gate missing from the allowed set
    GateNotAllowed { gate: GateVariant },

    /// Lead time cannot be derived from travel distance and speed
    InvalidLeadTime { distance: f64, speed: f64 },

    /// Combo multiplier parameters out of range
    InvalidCombo { reason: String },

    /// Maximum score negative or not finite
    InvalidMaxScore { max_score: f64 },

    /// JSON parse failure
    ParseFailed { reason: String },

    /// File read failure
    IoFailed { details: String },

    /// Beat stamp is NaN or infinite
    InvalidBeatStamp { beat_stamp: f64 },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::BpmInvalid { .. } => ConfigErrorCodes::BPM_INVALID,
            ConfigError::NoLanes => ConfigErrorCodes::NO_LANES,
            ConfigError::NoSpawnLocations => ConfigErrorCodes::NO_SPAWN_LOCATIONS,
            ConfigError::EmptyTierList => ConfigErrorCodes::EMPTY_TIER_LIST,
            ConfigError::InvalidTierWidth { .. } => ConfigErrorCodes::INVALID_TIER_WIDTH,
            ConfigError::InvalidTierSet { .. } => ConfigErrorCodes::INVALID_TIER_SET,
            ConfigError::EmptyGateSet => ConfigErrorCodes::EMPTY_GATE_SET,
            ConfigError::GateNotAllowed { .. } => ConfigErrorCodes::GATE_NOT_ALLOWED,
            ConfigError::InvalidLeadTime { .. } => ConfigErrorCodes::INVALID_LEAD_TIME,
            ConfigError::InvalidCombo { .. } => ConfigErrorCodes::INVALID_COMBO,
            ConfigError::InvalidMaxScore { .. } => ConfigErrorCodes::INVALID_MAX_SCORE,
            ConfigError::ParseFailed { .. } => ConfigErrorCodes::PARSE_FAILED,
            ConfigError::IoFailed { .. } => ConfigErrorCodes::IO_FAILED,
            ConfigError::InvalidBeatStamp { .. } => ConfigErrorCodes::INVALID_BEAT_STAMP,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::BpmInvalid { bpm } => {
                format!("BPM must be greater than 0 (got {})", bpm)
            }
            ConfigError::NoLanes => "At least one lane is required".to_string(),
            ConfigError::NoSpawnLocations => {
                "At least one spawn location is required".to_string()
            }
            ConfigError::EmptyTierList => "Judgment tier list is empty".to_string(),
            ConfigError::InvalidTierWidth { index, width } => {
                format!("Tier {} has invalid window width {}", index, width)
            }
            ConfigError::InvalidTierSet { reason } => {
                format!("Invalid judgment tiers: {}", reason)
            }
            ConfigError::EmptyGateSet => "Allowed gate set is empty".to_string(),
            ConfigError::GateNotAllowed { gate } => {
                format!("Gate {:?} is not in the allowed gate set", gate)
            }
            ConfigError::InvalidLeadTime { distance, speed } => {
                format!(
                    "Cannot derive lead time from travel distance {} and speed {}",
                    distance, speed
                )
            }
            ConfigError::InvalidCombo { reason } => {
                format!("Invalid combo parameters: {}", reason)
            }
            ConfigError::InvalidMaxScore { max_score } => {
                format!("Maximum score must be finite and >= 0 (got {})", max_score)
            }
            ConfigError::ParseFailed { reason } => format!("Failed to parse JSON: {}", reason),
            ConfigError::IoFailed { details } => format!("Failed to read file: {}", details),
            ConfigError::InvalidBeatStamp { beat_stamp } => {
                format!("Beat stamp must be finite (got {})", beat_stamp)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoFailed {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_codes() {
        assert_eq!(
            ConfigError::BpmInvalid { bpm: 0.0 }.code(),
            ConfigErrorCodes::BPM_INVALID
        );
        assert_eq!(ConfigError::NoLanes.code(), ConfigErrorCodes::NO_LANES);
        assert_eq!(
            ConfigError::NoSpawnLocations.code(),
            ConfigErrorCodes::NO_SPAWN_LOCATIONS
        );
        assert_eq!(
            ConfigError::EmptyTierList.code(),
            ConfigErrorCodes::EMPTY_TIER_LIST
        );
        assert_eq!(ConfigError::EmptyGateSet.code(), 1007);
        assert_eq!(
            ConfigError::GateNotAllowed {
                gate: GateVariant::Xnor
            }
            .code(),
            1008
        );
        assert_eq!(
            ConfigError::IoFailed {
                details: "gone".to_string()
            }
            .code(),
            1013
        );
        assert_eq!(
            ConfigError::InvalidBeatStamp {
                beat_stamp: f64::NAN
            }
            .code(),
            ConfigErrorCodes::INVALID_BEAT_STAMP
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::BpmInvalid { bpm: 0.0 };
        assert_eq!(err.message(), "BPM must be greater than 0 (got 0)");

        let err = ConfigError::GateNotAllowed {
            gate: GateVariant::Nor,
        };
        assert!(err.message().contains("Nor"));

        let err = ConfigError::InvalidTierWidth {
            index: 2,
            width: -0.5,
        };
        assert!(err.message().contains("Tier 2"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NoLanes;
        let display = format!("{}", err);
        assert!(display.contains("ConfigError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("missing beatmap");
        let err: ConfigError = io_err.into();
        match err {
            ConfigError::IoFailed { details } => assert!(details.contains("missing beatmap")),
            other => panic!("Expected IoFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: ConfigError = json_err.into();
        assert_eq!(err.code(), ConfigErrorCodes::PARSE_FAILED);
    }
}
