use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::capture::domain::media_device::{CaptureError, FacingMode, MediaDevice, MediaStream};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::{Frame, RGB_CHANNELS};

/// Virtual camera backed by a still image or a directory of images.
///
/// Frames are decoded when the stream opens and replayed in name order,
/// looping, one frame per `current_frame` call.
pub struct ImageSequenceDevice {
    source: PathBuf,
}

impl ImageSequenceDevice {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    fn image_paths(&self) -> Result<Vec<PathBuf>, CaptureError> {
        let meta = fs::metadata(&self.source).map_err(|e| io_error(&self.source, e))?;
        if meta.is_file() {
            return Ok(vec![self.source.clone()]);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.source)
            .map_err(|e| io_error(&self.source, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_image(p))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl MediaDevice for ImageSequenceDevice {
    fn open(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, CaptureError> {
        log::debug!(
            "Opening image sequence {} (facing {facing:?} ignored)",
            self.source.display()
        );
        let paths = self.image_paths()?;
        if paths.is_empty() {
            return Err(CaptureError::DeviceNotFound(format!(
                "no images in {}",
                self.source.display()
            )));
        }

        let frames = paths
            .iter()
            .enumerate()
            .map(|(i, path)| decode(path, i))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Virtual camera opened with {} frame(s)", frames.len());

        Ok(Box::new(ImageSequenceStream {
            frames,
            cursor: AtomicUsize::new(0),
        }))
    }
}

pub struct ImageSequenceStream {
    frames: Vec<Frame>,
    cursor: AtomicUsize,
}

impl MediaStream for ImageSequenceStream {
    fn current_frame(&self) -> Option<Frame> {
        if self.frames.is_empty() {
            return None;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        Some(self.frames[i].clone())
    }

    fn stop(&mut self) {
        self.frames.clear();
    }
}

fn decode(path: &Path, sequence: usize) -> Result<Frame, CaptureError> {
    let img = image::open(path)
        .map_err(|e| CaptureError::Device(format!("{}: {e}", path.display())))?
        .to_rgb8();
    let (w, h) = img.dimensions();
    Ok(Frame::new(img.into_raw(), w, h, RGB_CHANNELS, sequence))
}

fn io_error(path: &Path, e: io::Error) -> CaptureError {
    match e.kind() {
        io::ErrorKind::NotFound => CaptureError::DeviceNotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => {
            CaptureError::PermissionDenied(path.display().to_string())
        }
        _ => CaptureError::Device(format!("{}: {e}", path.display())),
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, w: u32, h: u32, value: u8) {
        image::RgbImage::from_pixel(w, h, image::Rgb([value, value, value]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_single_image_loops_same_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        write_png(&path, 6, 4, 50);

        let stream = ImageSequenceDevice::new(&path)
            .open(FacingMode::User)
            .unwrap();

        for _ in 0..3 {
            let frame = stream.current_frame().unwrap();
            assert_eq!(frame.dimensions(), (6, 4));
            assert_eq!(frame.data()[0], 50);
        }
    }

    #[test]
    fn test_directory_replays_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("b.png"), 2, 2, 20);
        write_png(&dir.path().join("a.png"), 2, 2, 10);
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let stream = ImageSequenceDevice::new(dir.path())
            .open(FacingMode::User)
            .unwrap();

        let frames: Vec<Frame> = (0..3).map(|_| stream.current_frame().unwrap()).collect();
        let values: Vec<u8> = frames.iter().map(|f| f.data()[0]).collect();
        let sequences: Vec<usize> = frames.iter().map(Frame::sequence).collect();
        assert_eq!(values, vec![10, 20, 10]);
        assert_eq!(sequences, vec![0, 1, 0]);
    }

    #[test]
    fn test_missing_source_is_device_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSequenceDevice::new(dir.path().join("missing")).open(FacingMode::User);
        assert!(matches!(result, Err(CaptureError::DeviceNotFound(_))));
    }

    #[test]
    fn test_empty_directory_is_device_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSequenceDevice::new(dir.path()).open(FacingMode::User);
        assert!(matches!(result, Err(CaptureError::DeviceNotFound(_))));
    }

    #[test]
    fn test_stop_releases_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        write_png(&path, 2, 2, 1);

        let mut stream = ImageSequenceDevice::new(&path)
            .open(FacingMode::User)
            .unwrap();
        stream.stop();

        assert!(stream.current_frame().is_none());
    }
}
