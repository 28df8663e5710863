use std::fmt;

use crate::capture::domain::media_device::{CaptureError, FacingMode, MediaDevice, MediaStream};
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Starting,
    Active,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Starting => write!(f, "starting"),
            CaptureState::Active => write!(f, "active"),
        }
    }
}

/// Identifies one `request_start` so a late open result can be matched to
/// the request that caused it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StartAttempt(pub u64);

/// Result of handing an opened (or failed) stream back to the controller.
#[derive(Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Activated,
    Failed(CaptureError),
    /// The attempt was stopped or superseded; any stream was released.
    Abandoned,
}

/// Owns the single camera stream of a session.
///
/// `idle -> starting -> active -> idle`, with `starting -> idle` on
/// failure. At most one stream is held at a time.
pub struct CaptureController {
    state: CaptureState,
    stream: Option<Box<dyn MediaStream>>,
    facing: FacingMode,
    next_attempt: u64,
    pending: Option<StartAttempt>,
}

impl CaptureController {
    pub fn new(facing: FacingMode) -> Self {
        Self {
            state: CaptureState::Idle,
            stream: None,
            facing,
            next_attempt: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CaptureState::Active
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Opens the device and activates in one step.
    ///
    /// A no-op returning `Ok` when already starting or active.
    pub fn start(&mut self, device: &dyn MediaDevice) -> Result<(), CaptureError> {
        let Some(attempt) = self.request_start() else {
            return Ok(());
        };
        match self.complete_start(attempt, device.open(self.facing)) {
            StartOutcome::Failed(e) => Err(e),
            StartOutcome::Activated | StartOutcome::Abandoned => Ok(()),
        }
    }

    /// `idle -> starting`. Returns `None` (and changes nothing) from any
    /// other state.
    pub fn request_start(&mut self) -> Option<StartAttempt> {
        if self.state != CaptureState::Idle {
            return None;
        }
        let attempt = StartAttempt(self.next_attempt);
        self.next_attempt += 1;
        self.pending = Some(attempt);
        self.state = CaptureState::Starting;
        Some(attempt)
    }

    /// Applies the open result of `attempt`. Results of any other attempt
    /// leave the state untouched and their streams are released.
    pub fn complete_start(
        &mut self,
        attempt: StartAttempt,
        opened: Result<Box<dyn MediaStream>, CaptureError>,
    ) -> StartOutcome {
        let current = self.state == CaptureState::Starting && self.pending == Some(attempt);
        match (current, opened) {
            (true, Ok(stream)) => {
                self.pending = None;
                self.stream = Some(stream);
                self.state = CaptureState::Active;
                StartOutcome::Activated
            }
            (true, Err(e)) => {
                self.pending = None;
                self.state = CaptureState::Idle;
                StartOutcome::Failed(e)
            }
            (false, Ok(mut stream)) => {
                stream.stop();
                StartOutcome::Abandoned
            }
            (false, Err(_)) => StartOutcome::Abandoned,
        }
    }

    /// Releases the stream synchronously and returns to idle.
    ///
    /// Returns `true` if anything changed; stopping while idle is a no-op.
    pub fn stop(&mut self) -> bool {
        match self.state {
            CaptureState::Idle => false,
            CaptureState::Starting => {
                self.pending = None;
                self.state = CaptureState::Idle;
                true
            }
            CaptureState::Active => {
                if let Some(mut stream) = self.stream.take() {
                    stream.stop();
                }
                self.state = CaptureState::Idle;
                true
            }
        }
    }

    /// Latest frame from the active stream, if any.
    pub fn current_frame(&self) -> Option<Frame> {
        if self.state != CaptureState::Active {
            return None;
        }
        self.stream.as_ref().and_then(|s| s.current_frame())
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::test_support::StubDevice;
    use super::*;

    #[test]
    fn test_start_activates_and_yields_frames() {
        let device = StubDevice::new(8, 6);
        let mut capture = CaptureController::new(FacingMode::User);

        capture.start(&device).unwrap();

        assert_eq!(capture.state(), CaptureState::Active);
        assert_eq!(capture.current_frame().unwrap().dimensions(), (8, 6));
    }

    #[test]
    fn test_start_while_active_is_noop() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        capture.start(&device).unwrap();

        capture.start(&device).unwrap();

        assert_eq!(device.opens.load(Ordering::SeqCst), 1);
        assert!(capture.is_active());
    }

    #[test]
    fn test_start_failure_returns_to_idle_with_reason() {
        let device = StubDevice::failing(CaptureError::PermissionDenied("denied".into()));
        let mut capture = CaptureController::new(FacingMode::User);

        let err = capture.start(&device).unwrap_err();

        assert_eq!(err.reason(), "denied");
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(capture.current_frame().is_none());
    }

    #[test]
    fn test_stop_releases_stream_before_returning() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        capture.start(&device).unwrap();

        assert!(capture.stop());

        assert!(device.all_released());
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(capture.current_frame().is_none());
    }

    #[test]
    fn test_stop_twice_is_idempotent() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        capture.start(&device).unwrap();

        assert!(capture.stop());
        assert!(!capture.stop());
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_restart_after_stop_reacquires_device() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        capture.start(&device).unwrap();
        capture.stop();

        capture.start(&device).unwrap();

        assert!(capture.is_active());
        assert_eq!(device.opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stream_arriving_after_stop_is_released() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        let attempt = capture.request_start().unwrap();
        assert!(capture.stop());

        let outcome = capture.complete_start(attempt, device.open(FacingMode::User));

        assert_eq!(outcome, StartOutcome::Abandoned);
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(device.all_released());
    }

    #[test]
    fn test_request_start_only_from_idle() {
        let mut capture = CaptureController::new(FacingMode::User);
        assert!(capture.request_start().is_some());
        assert!(capture.request_start().is_none());
        assert_eq!(capture.state(), CaptureState::Starting);
    }

    #[test]
    fn test_result_of_superseded_attempt_is_ignored() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        let first = capture.request_start().unwrap();
        capture.stop();
        let second = capture.request_start().unwrap();
        assert_ne!(first, second);

        let stale = capture.complete_start(first, Err(CaptureError::Device("timeout".into())));
        assert_eq!(stale, StartOutcome::Abandoned);
        assert_eq!(capture.state(), CaptureState::Starting);

        let outcome = capture.complete_start(second, device.open(FacingMode::User));
        assert_eq!(outcome, StartOutcome::Activated);
        assert!(capture.is_active());
    }

    #[test]
    fn test_stale_stream_released_while_new_attempt_pending() {
        let device = StubDevice::new(4, 4);
        let mut capture = CaptureController::new(FacingMode::User);
        let first = capture.request_start().unwrap();
        capture.stop();
        let _second = capture.request_start().unwrap();

        let outcome = capture.complete_start(first, device.open(FacingMode::User));

        assert_eq!(outcome, StartOutcome::Abandoned);
        assert_eq!(capture.state(), CaptureState::Starting);
        assert!(device.all_released());
    }

    #[test]
    fn test_drop_releases_stream() {
        let device = StubDevice::new(4, 4);
        {
            let mut capture = CaptureController::new(FacingMode::User);
            capture.start(&device).unwrap();
        }
        assert!(device.all_released());
    }
}
