// Error kinds surfaced by the CI-V engine, codecs and device models

use super::types::CommandCode;
use crate::codec::bcd::BcdError;
use crate::serial::SerialError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Command {command} is not supported by {model}")]
    UnsupportedCommand { model: String, command: CommandCode },

    #[error("Value {value} outside supported range {min}..={max}")]
    OutOfRange { value: u64, min: u64, max: u64 },

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Transport error: {0}")]
    Transport(#[from] SerialError),

    #[error("No reply from transceiver ({len} bytes read)")]
    NoReply { len: usize },

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Transceiver rejected command {0} (NG)")]
    Rejected(CommandCode),

    #[error("Unsupported device type: {0}")]
    UnsupportedDevice(String),

    #[error("Invalid address {0:?}: expected hexadecimal such as 0x94")]
    InvalidAddress(String),
}

impl From<BcdError> for RadioError {
    fn from(err: BcdError) -> Self {
        RadioError::MalformedReply(format!("BCD decode error: {}", err))
    }
}

pub type RadioResult<T> = std::result::Result<T, RadioError>;

/// Payload-free classification of a [`RadioError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCommand,
    UnsupportedCommand,
    OutOfRange,
    UnknownMode,
    Transport,
    NoReply,
    MalformedReply,
    Rejected,
    UnsupportedDevice,
    InvalidAddress,
}

impl RadioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RadioError::InvalidCommand(_) => ErrorKind::InvalidCommand,
            RadioError::UnsupportedCommand { .. } => ErrorKind::UnsupportedCommand,
            RadioError::OutOfRange { .. } => ErrorKind::OutOfRange,
            RadioError::UnknownMode(_) => ErrorKind::UnknownMode,
            RadioError::Transport(_) => ErrorKind::Transport,
            RadioError::NoReply { .. } => ErrorKind::NoReply,
            RadioError::MalformedReply(_) => ErrorKind::MalformedReply,
            RadioError::Rejected(_) => ErrorKind::Rejected,
            RadioError::UnsupportedDevice(_) => ErrorKind::UnsupportedDevice,
            RadioError::InvalidAddress(_) => ErrorKind::InvalidAddress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_kinds() {
        let err = RadioError::from(SerialError::Timeout(Duration::from_secs(1)));
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err = RadioError::from(BcdError::InvalidDigit(0xAB));
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
        assert!(err.to_string().contains("0xab"));
    }

    #[test]
    fn test_error_display() {
        let err = RadioError::UnsupportedCommand {
            model: "IC-706MKII".to_string(),
            command: CommandCode::sub(0x15, 0x11),
        };
        assert_eq!(
            err.to_string(),
            "Command 0x15 0x11 is not supported by IC-706MKII"
        );

        let err = RadioError::UnknownMode("filter code 0x07 not in generic table".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown mode: filter code 0x07 not in generic table"
        );
    }
}
