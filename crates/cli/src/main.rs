use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use facescope_core::analysis::infrastructure::scripted_face_analyzer::ScriptedFaceAnalyzer;
use facescope_core::capture::domain::capture_controller::CaptureState;
use facescope_core::capture::domain::media_device::FacingMode;
use facescope_core::capture::infrastructure::image_sequence_device::ImageSequenceDevice;
use facescope_core::export::infrastructure::directory_file_offer::DirectoryFileOffer;
use facescope_core::loading::infrastructure::http_model_resolver::HttpModelResolver;
use facescope_core::rendering::infrastructure::rgba_overlay_surface::RgbaOverlaySurface;
use facescope_core::session::runtime::{SessionHandle, SessionParts, SessionRuntime};
use facescope_core::session::session::SessionView;
use facescope_core::session::session_logger::StdoutSessionLogger;
use facescope_core::session::status_message::StatusMessage;
use facescope_core::shared::session_config::SessionConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Live face analysis over a camera feed, with an image sequence standing
/// in for the camera.
#[derive(Parser)]
#[command(name = "facescope")]
struct Cli {
    /// Image file or directory of images used as the camera feed.
    #[arg(long)]
    frames: PathBuf,

    /// JSON script of per-frame detections replayed by the analyzer.
    #[arg(long)]
    detections: PathBuf,

    /// Seconds to keep the camera running once started.
    #[arg(long, default_value = "5")]
    duration_secs: f64,

    /// Take a snapshot this many seconds after the camera starts.
    #[arg(long)]
    snapshot_after_secs: Option<f64>,

    /// Detection tick interval in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Directory holding model files, checked before downloading.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Directory snapshots are saved to.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Camera facing: user or environment.
    #[arg(long)]
    facing: Option<String>,

    /// Config file (defaults to the per-user config).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = build_config(&cli)?;

    let analyzer = ScriptedFaceAnalyzer::from_path(&cli.detections)?;
    let resolver = HttpModelResolver::new(config.model_base_url.clone())
        .with_bundled_dir(config.models_dir.clone())
        .with_progress(Box::new(download_progress));

    let handle = SessionRuntime::spawn(SessionParts {
        analyzer: Box::new(analyzer),
        resolver: Box::new(resolver),
        device: Arc::new(ImageSequenceDevice::new(&cli.frames)),
        surface: Box::new(RgbaOverlaySurface::new()),
        file_offer: Box::new(DirectoryFileOffer::new(config.snapshot_dir.clone())),
        logger: Box::new(StdoutSessionLogger::new()),
        config,
    });

    let outcome = drive(&handle, &cli);
    let logger = handle.shutdown();
    logger.summary();
    outcome
}

/// Runs one capture session: start when ready, snapshot, stop.
fn drive(handle: &SessionHandle, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let updates = handle.updates();
    let run_for = Duration::from_secs_f64(cli.duration_secs);
    let snapshot_after = cli.snapshot_after_secs.map(Duration::from_secs_f64);

    let mut last: Option<SessionView> = None;
    let mut start_requested = false;
    let mut running_since: Option<Instant> = None;
    let mut snapshot_requested = false;
    let mut stop_requested = false;

    loop {
        if let Ok(view) = updates.recv_timeout(POLL_INTERVAL) {
            report(last.as_ref(), &view);
            match &view.status {
                StatusMessage::LoadFailed(_) | StatusMessage::CameraError(_) => {
                    return Err(view.status.to_string().into());
                }
                StatusMessage::Stopped if stop_requested => return Ok(()),
                _ => {}
            }
            if view.ready && !start_requested {
                handle.start_capture();
                start_requested = true;
            }
            if view.capture == CaptureState::Active && running_since.is_none() {
                running_since = Some(Instant::now());
            }
            last = Some(view);
        }

        let Some(since) = running_since else { continue };
        let elapsed = since.elapsed();
        if let Some(after) = snapshot_after {
            if !snapshot_requested && elapsed >= after {
                handle.take_snapshot();
                snapshot_requested = true;
            }
        }
        if !stop_requested && elapsed >= run_for {
            handle.stop_capture();
            stop_requested = true;
        }
    }
}

fn report(previous: Option<&SessionView>, view: &SessionView) {
    if previous.map(|p| &p.status) != Some(&view.status) {
        println!("[status] {}", view.status);
    }
    if previous.map(|p| &p.latest) != Some(&view.latest) {
        match &view.latest {
            Some(result) => println!("[result] {result}"),
            None => println!("[result] no face"),
        }
    }
    if previous.and_then(|p| p.last_snapshot.as_ref()) != view.last_snapshot.as_ref() {
        if let Some(name) = &view.last_snapshot {
            println!("[snapshot] {name}");
        }
    }
}

fn build_config(cli: &Cli) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load_from(path)?,
        None => SessionConfig::load(),
    };
    if let Some(ms) = cli.interval_ms {
        config.tick_interval_ms = ms;
    }
    if let Some(dir) = &cli.models_dir {
        config.models_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.snapshot_dir {
        config.snapshot_dir = dir.clone();
    }
    if let Some(facing) = &cli.facing {
        config.facing_mode = parse_facing(facing)?;
    }
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.exists() {
        return Err(format!("Frames not found: {}", cli.frames.display()).into());
    }
    if !cli.detections.is_file() {
        return Err(format!("Detection script not found: {}", cli.detections.display()).into());
    }
    if !(cli.duration_secs.is_finite() && cli.duration_secs > 0.0) {
        return Err("--duration-secs must be positive".into());
    }
    if let Some(after) = cli.snapshot_after_secs {
        if !(after.is_finite() && after >= 0.0) {
            return Err("--snapshot-after-secs must not be negative".into());
        }
    }
    if cli.interval_ms == Some(0) {
        return Err("--interval-ms must be at least 1".into());
    }
    Ok(())
}

fn parse_facing(facing: &str) -> Result<FacingMode, Box<dyn std::error::Error>> {
    match facing {
        "user" => Ok(FacingMode::User),
        "environment" => Ok(FacingMode::Environment),
        other => Err(format!("Unknown facing mode: {other} (expected user or environment)").into()),
    }
}

fn download_progress(file_name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = downloaded as f64 / total as f64 * 100.0;
        eprint!("\rDownloading {file_name}: {pct:.0}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {file_name}: {} KB", downloaded / 1024);
    }
}
