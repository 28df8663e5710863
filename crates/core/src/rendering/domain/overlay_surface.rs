use crate::shared::frame::Frame;
use crate::shared::region::BoundingBox;

/// Straight (non-premultiplied) RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

/// Transparent 2D drawing layer aligned with the video frame.
pub trait OverlaySurface: Send {
    /// Sets the pixel size. Contents are unspecified afterwards; callers
    /// clear before drawing.
    fn resize(&mut self, width: u32, height: u32);

    fn dimensions(&self) -> (u32, u32);

    fn clear(&mut self);

    /// Outline of `rect`, drawn inward from its edges.
    fn stroke_rect(&mut self, rect: &BoundingBox, line_width: u32, color: Color);

    /// Filled square dot centred on `(x, y)`.
    fn fill_point(&mut self, x: f64, y: f64, radius: u32, color: Color);

    /// Current contents as an RGBA frame.
    fn pixels(&self) -> Frame;
}
