use crate::rendering::domain::overlay_surface::{Color, OverlaySurface};
use crate::shared::frame::Frame;
use crate::shared::region::BoundingBox;

/// In-memory RGBA overlay layer. Drawing is clipped to the buffer.
pub struct RgbaOverlaySurface {
    buffer: Frame,
}

impl RgbaOverlaySurface {
    pub fn new() -> Self {
        Self {
            buffer: Frame::transparent(0, 0),
        }
    }

    /// Paints `[x1, x2) x [y1, y2)`; bounds must already be clipped.
    fn fill_span(&mut self, x1: u32, y1: u32, x2: u32, y2: u32, color: Color) {
        let mut pixels = self.buffer.as_ndarray_mut();
        for row in y1 as usize..y2 as usize {
            for col in x1 as usize..x2 as usize {
                for (c, value) in color.0.iter().enumerate() {
                    pixels[[row, col, c]] = *value;
                }
            }
        }
    }
}

impl Default for RgbaOverlaySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface for RgbaOverlaySurface {
    fn resize(&mut self, width: u32, height: u32) {
        if self.buffer.dimensions() != (width, height) {
            self.buffer = Frame::transparent(width, height);
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn clear(&mut self) {
        self.buffer.data_mut().fill(0);
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, line_width: u32, color: Color) {
        let (w, h) = self.buffer.dimensions();
        let Some(r) = rect.clip_to(w, h) else {
            return;
        };
        let lw = line_width.max(1);
        let top_end = (r.y1 + lw).min(r.y2);
        let bottom_start = r.y2.saturating_sub(lw).max(r.y1);
        let left_end = (r.x1 + lw).min(r.x2);
        let right_start = r.x2.saturating_sub(lw).max(r.x1);

        self.fill_span(r.x1, r.y1, r.x2, top_end, color);
        self.fill_span(r.x1, bottom_start, r.x2, r.y2, color);
        self.fill_span(r.x1, r.y1, left_end, r.y2, color);
        self.fill_span(right_start, r.y1, r.x2, r.y2, color);
    }

    fn fill_point(&mut self, x: f64, y: f64, radius: u32, color: Color) {
        let side = (radius * 2 + 1) as f64;
        let dot = BoundingBox::new(
            x.round() - radius as f64,
            y.round() - radius as f64,
            side,
            side,
        );
        let (w, h) = self.buffer.dimensions();
        if let Some(r) = dot.clip_to(w, h) {
            self.fill_span(r.x1, r.y1, r.x2, r.y2, color);
        }
    }

    fn pixels(&self) -> Frame {
        self.buffer.clone()
    }
}
