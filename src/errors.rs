// SPDX-License-Identifier: GPL-3.0-only

//! Error types for depth capture

use crate::backends::session::SessionError;
use crate::constants::DEPTH_CAPTURE_FAILED;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors terminating a single capture call
///
/// None of these are retried internally; the caller may retry the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No camera/AR permission, or no sensing hardware
    SessionUnavailable(String),
    /// Sensing did not produce a frame within the settling window
    NoFrameAvailable,
    /// An encoding stage could not produce valid output
    EncodeFailed(String),
    /// Raw buffers do not match their declared geometry
    InvalidFrame(String),
}

/// Top-level error for the command-line front end
#[derive(Debug, Clone)]
pub enum AppError {
    /// Capture errors
    Capture(CaptureError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Structured error returned across the call boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelError {
    pub code: String,
    pub message: String,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SessionUnavailable(msg) => write!(f, "Session unavailable: {}", msg),
            CaptureError::NoFrameAvailable => write!(f, "No AR frame available"),
            CaptureError::EncodeFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CaptureError {}
impl std::error::Error for AppError {}
impl std::error::Error for ChannelError {}

impl From<SessionError> for CaptureError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoFrame => CaptureError::NoFrameAvailable,
            SessionError::InvalidFrame(msg) => CaptureError::InvalidFrame(msg),
            other => CaptureError::SessionUnavailable(other.to_string()),
        }
    }
}

impl From<CaptureError> for ChannelError {
    fn from(err: CaptureError) -> Self {
        ChannelError {
            code: DEPTH_CAPTURE_FAILED.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_taxonomy() {
        assert_eq!(
            CaptureError::from(SessionError::NoFrame),
            CaptureError::NoFrameAvailable
        );
        assert!(matches!(
            CaptureError::from(SessionError::PermissionDenied("camera".into())),
            CaptureError::SessionUnavailable(_)
        ));
        assert!(matches!(
            CaptureError::from(SessionError::InvalidFrame("short plane".into())),
            CaptureError::InvalidFrame(_)
        ));
    }

    #[test]
    fn test_channel_error_uses_single_code() {
        let err = ChannelError::from(CaptureError::EncodeFailed("jpeg".into()));
        assert_eq!(err.code, "DEPTH_CAPTURE_FAILED");
        assert_eq!(err.message, "Encoding failed: jpeg");
    }
}
