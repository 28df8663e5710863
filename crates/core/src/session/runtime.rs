use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, Receiver, Sender};

use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::capture::domain::capture_controller::StartAttempt;
use crate::capture::domain::media_device::{FacingMode, MediaDevice};
use crate::export::domain::file_offer::FileOffer;
use crate::loading::domain::model_resolver::ModelResolver;
use crate::loading::model_loader::{LoadError, ModelLoader};
use crate::rendering::domain::overlay_surface::OverlaySurface;
use crate::session::detection_loop::TickId;
use crate::session::session::{Effect, Session, SessionMessage, SessionView};
use crate::session::session_logger::SessionLogger;
use crate::shared::frame::Frame;
use crate::shared::session_config::SessionConfig;

type AnalysisJob = (TickId, Frame);

/// Collaborators a session runs with.
pub struct SessionParts {
    pub config: SessionConfig,
    pub analyzer: Box<dyn FaceAnalyzer>,
    pub resolver: Box<dyn ModelResolver>,
    pub device: Arc<dyn MediaDevice>,
    pub surface: Box<dyn OverlaySurface>,
    pub file_offer: Box<dyn FileOffer>,
    pub logger: Box<dyn SessionLogger>,
}

/// Executes a [`Session`] on threads.
///
/// Layout: `loader → analysis worker`, `camera opener (per start)`, and a
/// controller thread that owns the session and is the only place its
/// state changes. Workers report back over one message channel.
pub struct SessionRuntime;

impl SessionRuntime {
    pub fn spawn(parts: SessionParts) -> SessionHandle {
        let SessionParts {
            config,
            analyzer,
            resolver,
            device,
            surface,
            file_offer,
            logger,
        } = parts;

        let (events_tx, events_rx) = crossbeam_channel::unbounded::<SessionMessage>();
        let (updates_tx, updates_rx) = crossbeam_channel::unbounded::<SessionView>();
        let (jobs_tx, jobs_rx) = crossbeam_channel::bounded::<AnalysisJob>(1);

        let loader = ModelLoader::new(resolver);
        let cancel_loading = loader.cancel_flag();
        spawn_analysis_worker(loader, analyzer, jobs_rx, events_tx.clone());

        let session = Session::new(config.facing_mode, surface, file_offer, logger);
        let controller = Controller {
            session,
            events_tx: events_tx.clone(),
            events_rx,
            updates_tx,
            jobs_tx,
            device,
            interval: config.tick_interval(),
            cancel_loading,
        };
        let handle = std::thread::spawn(move || controller.run());

        SessionHandle {
            events: events_tx,
            updates: updates_rx,
            controller: Some(handle),
        }
    }
}

/// Client side of a running session.
pub struct SessionHandle {
    events: Sender<SessionMessage>,
    updates: Receiver<SessionView>,
    controller: Option<JoinHandle<Box<dyn SessionLogger>>>,
}

impl SessionHandle {
    pub fn start_capture(&self) {
        self.send(SessionMessage::StartCapture);
    }

    pub fn stop_capture(&self) {
        self.send(SessionMessage::StopCapture);
    }

    pub fn take_snapshot(&self) {
        self.send(SessionMessage::TakeSnapshot);
    }

    /// Views published after every message that changed one. The first
    /// item is the initial view.
    pub fn updates(&self) -> Receiver<SessionView> {
        self.updates.clone()
    }

    /// Tears the session down, waits for the controller, and returns the
    /// session's logger so the caller can emit a summary.
    pub fn shutdown(mut self) -> Box<dyn SessionLogger> {
        self.send(SessionMessage::Teardown);
        match self.controller.take().map(JoinHandle::join) {
            Some(Ok(logger)) => logger,
            Some(Err(panic)) => std::panic::resume_unwind(panic),
            None => unreachable!("controller is only taken by shutdown"),
        }
    }

    fn send(&self, message: SessionMessage) {
        if self.events.send(message).is_err() {
            log::debug!("Session controller already stopped");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.controller.take() {
            self.send(SessionMessage::Teardown);
            let _ = handle.join();
        }
    }
}

struct Controller {
    session: Session,
    events_tx: Sender<SessionMessage>,
    events_rx: Receiver<SessionMessage>,
    updates_tx: Sender<SessionView>,
    jobs_tx: Sender<AnalysisJob>,
    device: Arc<dyn MediaDevice>,
    interval: Duration,
    cancel_loading: Arc<AtomicBool>,
}

impl Controller {
    fn run(mut self) -> Box<dyn SessionLogger> {
        let mut ticker = never();
        let mut published = self.session.view();
        let _ = self.updates_tx.send(published.clone());

        while !self.session.is_torn_down() {
            let message = select! {
                recv(self.events_rx) -> event => event.unwrap_or(SessionMessage::Teardown),
                recv(ticker) -> _ => SessionMessage::Tick,
            };

            for effect in self.session.update(message) {
                match effect {
                    Effect::OpenCamera { attempt, facing } => self.open_camera(attempt, facing),
                    Effect::StartTicker => ticker = crossbeam_channel::tick(self.interval),
                    Effect::StopTicker => ticker = never(),
                    Effect::Analyze { tick, frame } => self.dispatch(tick, frame),
                    Effect::CancelLoading => self.cancel_loading.store(true, Ordering::Relaxed),
                }
            }

            let view = self.session.view();
            if view != published {
                published = view;
                let _ = self.updates_tx.send(published.clone());
            }
        }

        // Late camera opens still queued must release their streams.
        for message in self.events_rx.try_iter() {
            self.session.update(message);
        }

        self.session.into_logger()
    }

    fn open_camera(&self, attempt: StartAttempt, facing: FacingMode) {
        let device = self.device.clone();
        let events = self.events_tx.clone();
        std::thread::spawn(move || {
            let outcome = device.open(facing);
            let opened = SessionMessage::CaptureOpened { attempt, outcome };
            if let Err(returned) = events.send(opened) {
                if let SessionMessage::CaptureOpened {
                    outcome: Ok(mut stream),
                    ..
                } = returned.into_inner()
                {
                    stream.stop();
                }
            }
        });
    }

    fn dispatch(&self, tick: TickId, frame: Frame) {
        if self.jobs_tx.try_send((tick, frame)).is_err() {
            let _ = self.events_tx.send(SessionMessage::DetectionSettled {
                tick,
                outcome: Err("analysis worker unavailable".into()),
                elapsed: Duration::ZERO,
            });
        }
    }
}

/// Loads the models, then serves analysis jobs until the controller
/// goes away.
fn spawn_analysis_worker(
    loader: ModelLoader,
    analyzer: Box<dyn FaceAnalyzer>,
    jobs: Receiver<AnalysisJob>,
    events: Sender<SessionMessage>,
) {
    std::thread::spawn(move || {
        let mut ready = match loader.load(analyzer) {
            Ok(ready) => ready,
            Err(LoadError::Cancelled) => {
                log::debug!("Model loading cancelled");
                return;
            }
            Err(e) => {
                let _ = events.send(SessionMessage::ModelLoadFailed(e));
                return;
            }
        };
        if events.send(SessionMessage::ModelsLoaded).is_err() {
            return;
        }

        for (tick, frame) in jobs {
            let started = Instant::now();
            let outcome = ready.analyze(&frame).map_err(|e| e.to_string());
            let settled = SessionMessage::DetectionSettled {
                tick,
                outcome,
                elapsed: started.elapsed(),
            };
            if events.send(settled).is_err() {
                break;
            }
        }
    });
}
