//! Facial landmark point set (68 points for the standard landmark model).

use serde::{Deserialize, Serialize};

use crate::shared::region::BoundingBox;

pub const LANDMARK_POINT_COUNT: usize = 68;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    points: Vec<(f64, f64)>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Tight box around all finite points.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut finite = self
            .points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite());
        let &(x0, y0) = finite.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for &(x, y) in finite {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty() {
        let lm = FaceLandmarks::default();
        assert!(lm.is_empty());
        assert!(lm.bounds().is_none());
    }

    #[test]
    fn test_bounds_spans_all_points() {
        let lm = FaceLandmarks::new(vec![(10.0, 50.0), (30.0, 20.0), (20.0, 40.0)]);
        let b = lm.bounds().unwrap();
        assert_relative_eq!(b.x, 10.0);
        assert_relative_eq!(b.y, 20.0);
        assert_relative_eq!(b.width, 20.0);
        assert_relative_eq!(b.height, 30.0);
    }

    #[test]
    fn test_bounds_skips_non_finite_points() {
        let lm = FaceLandmarks::new(vec![(f64::NAN, 1.0), (5.0, 5.0)]);
        let b = lm.bounds().unwrap();
        assert_relative_eq!(b.x, 5.0);
        assert_relative_eq!(b.width, 0.0);
    }

    #[test]
    fn test_deserializes_from_point_arrays() {
        let lm: FaceLandmarks = serde_json::from_str("[[1.0, 2.0], [3.5, 4.5]]").unwrap();
        assert_eq!(lm.points(), &[(1.0, 2.0), (3.5, 4.5)]);
    }
}
