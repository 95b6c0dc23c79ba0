/*!
 * Error types for the Tether client
 */

use std::fmt;
use std::io;
use tether_connect::ConnectError;

pub type Result<T> = std::result::Result<T, TetherError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug)]
pub enum TetherError {
    /// Configuration error
    Config(String),

    /// I/O error
    Io(io::Error),

    /// Session layer error
    Connect(ConnectError),
}

impl TetherError {
    /// Get the process exit code for this error
    ///
    /// The client only stops on its own when it cannot start, so every error
    /// that reaches `main` is fatal.
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }
}

impl fmt::Display for TetherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TetherError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            TetherError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
            TetherError::Connect(err) => {
                write!(f, "Session error: {}", err)
            }
        }
    }
}

impl std::error::Error for TetherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TetherError::Io(err) => Some(err),
            TetherError::Connect(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TetherError {
    fn from(err: io::Error) -> Self {
        TetherError::Io(err)
    }
}

impl From<ConnectError> for TetherError {
    fn from(err: ConnectError) -> Self {
        TetherError::Connect(err)
    }
}
