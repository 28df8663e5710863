use std::time::Duration;

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::analysis::domain::latest_result::LatestResult;
use crate::capture::domain::capture_controller::{
    CaptureController, CaptureState, StartAttempt, StartOutcome,
};
use crate::capture::domain::media_device::{CaptureError, FacingMode, MediaStream};
use crate::export::domain::file_offer::FileOffer;
use crate::export::snapshot_exporter::SnapshotExporter;
use crate::loading::domain::model_readiness::ModelReadiness;
use crate::loading::model_loader::LoadError;
use crate::rendering::domain::overlay_surface::OverlaySurface;
use crate::rendering::overlay_renderer::OverlayRenderer;
use crate::session::detection_loop::{DetectionLoop, TickId};
use crate::session::session_logger::{
    SessionLogger, FACES_METRIC, FAILURES_METRIC, INFERENCE_STAGE,
};
use crate::session::status_message::StatusMessage;
use crate::shared::frame::Frame;

/// Inputs to the session: user commands and completions of suspended work.
pub enum SessionMessage {
    ModelsLoaded,
    ModelLoadFailed(LoadError),
    StartCapture,
    CaptureOpened {
        attempt: StartAttempt,
        outcome: Result<Box<dyn MediaStream>, CaptureError>,
    },
    StopCapture,
    Tick,
    DetectionSettled {
        tick: TickId,
        outcome: Result<Vec<FaceAnalysis>, String>,
        elapsed: Duration,
    },
    TakeSnapshot,
    Teardown,
}

/// Suspending work the session asks its runtime to perform.
#[derive(Debug, PartialEq)]
pub enum Effect {
    OpenCamera {
        attempt: StartAttempt,
        facing: FacingMode,
    },
    StartTicker,
    StopTicker,
    Analyze { tick: TickId, frame: Frame },
    CancelLoading,
}

/// Read-only projection of the session for the user interface.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionView {
    pub ready: bool,
    pub capture: CaptureState,
    pub detecting: bool,
    pub status: StatusMessage,
    pub latest: Option<LatestResult>,
    pub last_snapshot: Option<String>,
}

/// The single context object of a capture/analysis session.
///
/// Owns readiness, the camera, the detection loop, the overlay and the
/// exporter. All state changes go through [`Session::update`]; suspending
/// work is returned as [`Effect`]s and its completion comes back as a
/// [`SessionMessage`]. The detection loop runs iff the models are ready
/// and capture is active, re-evaluated after every message.
pub struct Session {
    readiness: ModelReadiness,
    capture: CaptureController,
    detection: DetectionLoop,
    renderer: OverlayRenderer,
    exporter: SnapshotExporter,
    status: StatusMessage,
    /// Frame the current overlay was drawn for.
    shown_frame: Option<Frame>,
    last_snapshot: Option<String>,
    logger: Box<dyn SessionLogger>,
    torn_down: bool,
}

impl Session {
    pub fn new(
        facing: FacingMode,
        surface: Box<dyn OverlaySurface>,
        file_offer: Box<dyn FileOffer>,
        logger: Box<dyn SessionLogger>,
    ) -> Self {
        Self {
            readiness: ModelReadiness::default(),
            capture: CaptureController::new(facing),
            detection: DetectionLoop::new(),
            renderer: OverlayRenderer::new(surface),
            exporter: SnapshotExporter::new(file_offer),
            status: StatusMessage::LoadingModels,
            shown_frame: None,
            last_snapshot: None,
            logger,
            torn_down: false,
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            ready: self.readiness.is_ready(),
            capture: self.capture.state(),
            detecting: self.detection.is_active(),
            status: self.status.clone(),
            latest: self.detection.latest().cloned(),
            last_snapshot: self.last_snapshot.clone(),
        }
    }

    pub fn overlay(&self) -> Frame {
        self.renderer.surface().pixels()
    }

    pub fn into_logger(self) -> Box<dyn SessionLogger> {
        let Session {
            logger,
            mut capture,
            ..
        } = self;
        capture.stop();
        logger
    }

    pub fn update(&mut self, message: SessionMessage) -> Vec<Effect> {
        if self.torn_down {
            if let SessionMessage::CaptureOpened {
                outcome: Ok(mut stream),
                ..
            } = message
            {
                stream.stop();
            }
            return Vec::new();
        }

        let mut effects = Vec::new();
        match message {
            SessionMessage::ModelsLoaded => {
                if self.readiness.mark_ready() && self.capture.state() == CaptureState::Idle {
                    self.status = StatusMessage::ModelsLoaded;
                }
            }
            SessionMessage::ModelLoadFailed(e) => {
                log::error!("Model loading failed: {e}");
                self.status = StatusMessage::LoadFailed(e.to_string());
            }
            SessionMessage::StartCapture => {
                if let Some(attempt) = self.capture.request_start() {
                    self.status = StatusMessage::CameraStarting;
                    effects.push(Effect::OpenCamera {
                        attempt,
                        facing: self.capture.facing(),
                    });
                } else {
                    log::debug!("Start ignored: capture is {}", self.capture.state());
                }
            }
            SessionMessage::CaptureOpened { attempt, outcome } => match self
                .capture
                .complete_start(attempt, outcome)
            {
                StartOutcome::Activated => {
                    self.logger.info("Camera started");
                    self.status = StatusMessage::Running;
                }
                StartOutcome::Failed(e) => {
                    log::warn!("Camera failed to start: {e}");
                    self.status = StatusMessage::CameraError(e.reason().to_string());
                }
                StartOutcome::Abandoned => {
                    log::debug!("Ignored camera result of superseded attempt {attempt:?}");
                }
            },
            SessionMessage::StopCapture => {
                if self.capture.stop() {
                    self.shown_frame = None;
                    self.logger.info("Camera stopped");
                    self.status = StatusMessage::Stopped;
                }
            }
            SessionMessage::Tick => {
                let capture = &self.capture;
                if let Some((tick, frame)) = self.detection.begin_tick(|| capture.current_frame()) {
                    effects.push(Effect::Analyze { tick, frame });
                }
            }
            SessionMessage::DetectionSettled {
                tick,
                outcome,
                elapsed,
            } => self.settle(tick, outcome, elapsed),
            SessionMessage::TakeSnapshot => self.snapshot(),
            SessionMessage::Teardown => {
                self.torn_down = true;
                self.capture.stop();
                self.detection.set_active(false);
                effects.push(Effect::StopTicker);
                effects.push(Effect::CancelLoading);
                return effects;
            }
        }

        effects.extend(self.refresh_activation());
        effects
    }

    fn settle(&mut self, tick: TickId, outcome: Result<Vec<FaceAnalysis>, String>, elapsed: Duration) {
        self.logger
            .timing(INFERENCE_STAGE, elapsed.as_secs_f64() * 1000.0);
        if outcome.is_err() {
            self.logger.metric(FAILURES_METRIC, 1.0);
        }
        if let Some(applied) = self.detection.settle(tick, outcome) {
            self.logger
                .metric(FACES_METRIC, applied.detections.len() as f64);
            self.renderer
                .render(&applied.detections, applied.dimensions());
            self.shown_frame = Some(applied.frame);
        }
    }

    /// Pairs the overlay with the frame it was drawn for; before the first
    /// applied tick the live frame is used.
    fn snapshot(&mut self) {
        let frame = if self.capture.is_active() {
            self.shown_frame
                .clone()
                .or_else(|| self.capture.current_frame())
        } else {
            None
        };
        let overlay = self.renderer.surface().pixels();
        match self.exporter.capture(frame.as_ref(), &overlay) {
            Ok(Some(name)) => self.last_snapshot = Some(name),
            Ok(None) => log::info!("Snapshot ignored: camera is not running"),
            Err(e) => log::warn!("Snapshot failed: {e}"),
        }
    }

    fn refresh_activation(&mut self) -> Option<Effect> {
        let should_run = self.readiness.is_ready() && self.capture.is_active();
        match self.detection.set_active(should_run) {
            Some(true) => {
                log::debug!("Detection loop activated");
                Some(Effect::StartTicker)
            }
            Some(false) => {
                log::debug!("Detection loop deactivated");
                Some(Effect::StopTicker)
            }
            None => None,
        }
    }
}
