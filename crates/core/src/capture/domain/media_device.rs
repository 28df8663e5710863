use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("no camera found: {0}")]
    DeviceNotFound(String),
    #[error("camera failure: {0}")]
    Device(String),
}

impl CaptureError {
    /// Underlying reason text, shown to the user.
    pub fn reason(&self) -> &str {
        match self {
            CaptureError::PermissionDenied(r)
            | CaptureError::DeviceNotFound(r)
            | CaptureError::Device(r) => r,
        }
    }
}

/// Camera hardware access.
pub trait MediaDevice: Send + Sync {
    fn open(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// A live video stream acquired from a [`MediaDevice`].
pub trait MediaStream: Send {
    /// The most recent frame, or `None` once the stream has stopped or has
    /// not produced a frame yet.
    fn current_frame(&self) -> Option<Frame>;

    /// Releases every track. Must return only after the hardware is free
    /// so the device can be reopened immediately.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strips_category() {
        let err = CaptureError::PermissionDenied("user dismissed prompt".into());
        assert_eq!(err.reason(), "user dismissed prompt");
        assert_eq!(err.to_string(), "permission denied: user dismissed prompt");
    }

    #[test]
    fn test_facing_mode_serde() {
        let json = serde_json::to_string(&FacingMode::Environment).unwrap();
        assert_eq!(json, "\"environment\"");
        let parsed: FacingMode = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, FacingMode::User);
    }
}
