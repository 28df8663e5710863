use std::fmt;

/// Human-readable lifecycle phase shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusMessage {
    LoadingModels,
    ModelsLoaded,
    LoadFailed(String),
    CameraStarting,
    CameraError(String),
    Running,
    Stopped,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::LoadingModels => write!(f, "Loading models\u{2026}"),
            StatusMessage::ModelsLoaded => write!(f, "Models loaded"),
            StatusMessage::LoadFailed(reason) => write!(f, "Model loading failed: {reason}"),
            StatusMessage::CameraStarting => write!(f, "Starting camera\u{2026}"),
            StatusMessage::CameraError(reason) => write!(f, "Camera error: {reason}"),
            StatusMessage::Running => write!(f, "Running"),
            StatusMessage::Stopped => write!(f, "Stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_texts_carry_reason() {
        assert_eq!(
            StatusMessage::CameraError("denied".into()).to_string(),
            "Camera error: denied"
        );
        assert_eq!(
            StatusMessage::LoadFailed("timeout".into()).to_string(),
            "Model loading failed: timeout"
        );
    }
}
