use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::export::domain::file_offer::FileOffer;
use crate::shared::constants::{SNAPSHOT_EXTENSION, SNAPSHOT_PREFIX};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to encode snapshot: {0}")]
    Encode(String),
    #[error("failed to offer snapshot: {0}")]
    Offer(String),
}

/// Composites the live frame and the overlay into one PNG.
pub struct SnapshotExporter {
    offer: Box<dyn FileOffer>,
}

impl SnapshotExporter {
    pub fn new(offer: Box<dyn FileOffer>) -> Self {
        Self { offer }
    }

    /// Exports `frame` with `overlay` on top, named from the current time.
    ///
    /// Without a frame nothing is exported and `Ok(None)` is returned.
    pub fn capture(
        &self,
        frame: Option<&Frame>,
        overlay: &Frame,
    ) -> Result<Option<String>, ExportError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        self.capture_at(frame, overlay, millis)
    }

    pub fn capture_at(
        &self,
        frame: Option<&Frame>,
        overlay: &Frame,
        timestamp_ms: u128,
    ) -> Result<Option<String>, ExportError> {
        let Some(frame) = frame else {
            log::debug!("Snapshot skipped: no active frame source");
            return Ok(None);
        };

        let composite = compose(frame, overlay)?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(composite)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ExportError::Encode(e.to_string()))?;

        let file_name = snapshot_file_name(timestamp_ms);
        self.offer
            .offer(&bytes, &file_name)
            .map_err(|e| ExportError::Offer(e.to_string()))?;
        log::info!("Snapshot offered as {file_name}");
        Ok(Some(file_name))
    }
}

pub fn snapshot_file_name(timestamp_ms: u128) -> String {
    format!("{SNAPSHOT_PREFIX}{timestamp_ms}.{SNAPSHOT_EXTENSION}")
}

/// Frame first, then the overlay alpha-blended on top at the frame's
/// native resolution.
fn compose(frame: &Frame, overlay: &Frame) -> Result<RgbaImage, ExportError> {
    let (width, height) = frame.dimensions();
    let mut base = to_image(&frame.to_rgba())?;

    let (ow, oh) = overlay.dimensions();
    if ow == 0 || oh == 0 {
        return Ok(base);
    }
    let mut top = to_image(&overlay.to_rgba())?;
    if (ow, oh) != (width, height) {
        top = imageops::resize(&top, width, height, FilterType::Triangle);
    }
    imageops::overlay(&mut base, &top, 0, 0);
    Ok(base)
}

fn to_image(frame: &Frame) -> Result<RgbaImage, ExportError> {
    RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or_else(|| ExportError::Encode("frame data does not match its dimensions".into()))
}
