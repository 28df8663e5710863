use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::rendering::domain::overlay_surface::{Color, OverlaySurface};

pub const BOX_COLOR: Color = Color([0, 0, 255, 255]);
pub const LANDMARK_COLOR: Color = Color([0, 255, 0, 255]);
pub const BOX_LINE_WIDTH: u32 = 2;
pub const LANDMARK_RADIUS: u32 = 1;

/// Draws detection boxes and landmarks onto the overlay surface.
///
/// Keeps no state between calls besides the surface size.
pub struct OverlayRenderer {
    surface: Box<dyn OverlaySurface>,
}

impl OverlayRenderer {
    pub fn new(surface: Box<dyn OverlaySurface>) -> Self {
        Self { surface }
    }

    /// Resizes to the frame, clears, then draws every detection. An empty
    /// set just clears the previous annotations.
    pub fn render(&mut self, detections: &[FaceAnalysis], frame_dimensions: (u32, u32)) {
        let (width, height) = frame_dimensions;
        self.surface.resize(width, height);
        self.surface.clear();

        for face in detections {
            self.surface
                .stroke_rect(&face.bounding_box, BOX_LINE_WIDTH, BOX_COLOR);
            for &(x, y) in face.landmarks.points() {
                self.surface.fill_point(x, y, LANDMARK_RADIUS, LANDMARK_COLOR);
            }
        }
    }

    pub fn surface(&self) -> &dyn OverlaySurface {
        self.surface.as_ref()
    }
}
