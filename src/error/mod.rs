// Error types for the gate rhythm core
//
// This module defines custom error types for session configuration and
// in-tick session failures, with numeric error codes so host layers can
// react to them without matching on message text.

mod config;
mod session;

pub use config::{log_config_error, ConfigError, ConfigErrorCodes};
pub use session::{log_session_error, SessionError, SessionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the host boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
