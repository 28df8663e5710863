use std::fmt;

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::shared::constants::UNKNOWN_EMOTION;

/// Textual summary of one face, as shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatestResult {
    pub age: u32,
    pub gender: String,
    pub emotion: String,
}

impl LatestResult {
    /// Summarizes the first face in analyzer order, or `None` for an empty
    /// set.
    ///
    /// The first face is used as-is rather than the largest or most
    /// confident one.
    pub fn from_detections(detections: &[FaceAnalysis]) -> Option<Self> {
        detections.first().map(Self::from_face)
    }

    pub fn from_face(face: &FaceAnalysis) -> Self {
        let emotion = face.expressions.dominant().unwrap_or(UNKNOWN_EMOTION);
        Self {
            age: display_age(face.age),
            gender: face.gender.clone(),
            emotion: emotion.to_string(),
        }
    }
}

/// Nearest whole year, halves away from zero; negative or non-finite
/// estimates display as 0.
fn display_age(age: f64) -> u32 {
    if !age.is_finite() || age <= 0.0 {
        return 0;
    }
    age.round().min(u32::MAX as f64) as u32
}

impl fmt::Display for LatestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "age {}, gender {}, emotion {}",
            self.age, self.gender, self.emotion
        )
    }
}
