/// Base URL the face analysis model weights are fetched from.
pub const MODEL_BASE_URL: &str = "https://vladmandic.github.io/face-api/model";

/// Interval between detection ticks while the loop is active.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 300;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const SNAPSHOT_PREFIX: &str = "snapshot_";
pub const SNAPSHOT_EXTENSION: &str = "png";

/// Emotion label reported when a face carries no expression scores.
pub const UNKNOWN_EMOTION: &str = "unknown";
