use serde::{Deserialize, Serialize};

/// Axis-aligned face box in frame pixel coordinates.
///
/// Detectors report sub-pixel geometry, so coordinates stay `f64` until
/// they are snapped for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer pixel rectangle, clipped to a surface. `x2`/`y2` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Snaps to whole pixels and clips to `width x height`.
    ///
    /// Returns `None` when nothing of the box is visible.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        if !self.x.is_finite() || !self.y.is_finite() || self.area() <= 0.0 {
            return None;
        }
        let x1 = self.x.round().clamp(0.0, width as f64) as u32;
        let y1 = self.y.round().clamp(0.0, height as f64) as u32;
        let x2 = self.right().round().clamp(0.0, width as f64) as u32;
        let y2 = self.bottom().round().clamp(0.0, height as f64) as u32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(PixelRect { x1, y1, x2, y2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_edges_and_area() {
        let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        assert_relative_eq!(b.right(), 40.0);
        assert_relative_eq!(b.bottom(), 60.0);
        assert_relative_eq!(b.area(), 1200.0);
    }

    #[test]
    fn test_clip_inside_surface_rounds_to_pixels() {
        let b = BoundingBox::new(10.4, 20.6, 30.0, 40.0);
        let rect = b.clip_to(100, 100).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x1: 10,
                y1: 21,
                x2: 40,
                y2: 61
            }
        );
    }

    #[test]
    fn test_clip_partially_outside_is_clamped() {
        let b = BoundingBox::new(-20.0, 80.0, 50.0, 50.0);
        let rect = b.clip_to(100, 100).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x1: 0,
                y1: 80,
                x2: 30,
                y2: 100
            }
        );
    }

    #[rstest]
    #[case::fully_outside(BoundingBox::new(200.0, 200.0, 10.0, 10.0))]
    #[case::zero_width(BoundingBox::new(10.0, 10.0, 0.0, 10.0))]
    #[case::negative_height(BoundingBox::new(10.0, 10.0, 10.0, -5.0))]
    #[case::not_finite(BoundingBox::new(f64::NAN, 10.0, 10.0, 10.0))]
    fn test_clip_invisible_returns_none(#[case] b: BoundingBox) {
        assert!(b.clip_to(100, 100).is_none());
    }
}
