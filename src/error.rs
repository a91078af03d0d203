use std::time::Duration;

use thiserror::Error;

/// Failure classes surfaced across the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DeviceNotFound,
    ConnectionFailure,
    CommandNotSupported,
    CommandExecutionFailure,
    InvalidResponse,
}

#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("'{command}' is not supported by this interface. {reason}")]
    NotSupported {
        command: &'static str,
        reason: &'static str,
    },

    #[error("Command failed: {0}")]
    CommandExecution(String),

    #[error("Command timeout after {elapsed:?}: {command}")]
    CommandTimeout { command: String, elapsed: Duration },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SwitchError {
    /// Taxonomy kind of this error. Argument validation failures are not
    /// part of the taxonomy and return `None`.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SwitchError::DeviceNotFound(_) => Some(ErrorKind::DeviceNotFound),
            SwitchError::Connection(_) => Some(ErrorKind::ConnectionFailure),
            SwitchError::NotSupported { .. } => Some(ErrorKind::CommandNotSupported),
            SwitchError::CommandExecution(_) | SwitchError::CommandTimeout { .. } => {
                Some(ErrorKind::CommandExecutionFailure)
            }
            SwitchError::InvalidResponse(_) => Some(ErrorKind::InvalidResponse),
            SwitchError::InvalidArgument(_) => None,
        }
    }
}

pub type SwitchResult<T> = std::result::Result<T, SwitchError>;
