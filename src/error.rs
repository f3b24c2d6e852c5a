//! Error taxonomy
//!
//! Nothing here ends a monitoring session: input and detector failures are
//! reported per frame and the tracker is left untouched for that tick.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Empty, corrupt or zero-size image
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Malformed request or evidence
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("detector failure: {0}")]
    Detector(#[from] DetectorError),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("replay line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("processing error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Stable machine-readable code for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFrame(_) => "invalid_frame",
            Self::InvalidInput(_) => "invalid_input",
            Self::Detector(_) => "detector_failure",
            Self::SessionNotFound(_) => "session_not_found",
            Self::Config(_) => "config_error",
            Self::Replay { .. } => "replay_error",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Caller can retry with the next frame
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidFrame(_) | Self::InvalidInput(_) | Self::Detector(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectorError {
    #[error("no face detector configured; supply detections with the frame")]
    Unavailable,

    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_error_is_input_error() {
        let err: MonitorError = DetectorError::Unavailable.into();
        assert!(err.is_input_error());
        assert_eq!(err.code(), "detector_failure");
    }

    #[test]
    fn test_session_not_found_is_not_input_error() {
        let err = MonitorError::SessionNotFound("abc".into());
        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "session not found: abc");
    }
}
