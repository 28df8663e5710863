use serde::{Deserialize, Serialize};

use crate::analysis::domain::expression_scores::ExpressionScores;
use crate::analysis::domain::face_landmarks::FaceLandmarks;
use crate::shared::region::BoundingBox;

/// Everything the analyzer reports for one face in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceAnalysis {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub landmarks: FaceLandmarks,
    #[serde(default)]
    pub expressions: ExpressionScores,
    pub age: f64,
    pub gender: String,
    #[serde(default = "default_score")]
    pub gender_probability: f64,
}

fn default_score() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "box": {"x": 10, "y": 20, "width": 100, "height": 120},
            "score": 0.93,
            "landmarks": [[30, 40], [50, 40]],
            "expressions": {"sad": 0.2, "happy": 0.7},
            "age": 24.4,
            "gender": "male",
            "gender_probability": 0.88
        }"#;
        let face: FaceAnalysis = serde_json::from_str(json).unwrap();
        assert_relative_eq!(face.bounding_box.width, 100.0);
        assert_relative_eq!(face.score, 0.93);
        assert_eq!(face.landmarks.len(), 2);
        assert_eq!(face.expressions.dominant(), Some("happy"));
        assert_relative_eq!(face.age, 24.4);
        assert_eq!(face.gender, "male");
    }

    #[test]
    fn test_deserialize_minimal_record_uses_defaults() {
        let json = r#"{"box": {"x": 0, "y": 0, "width": 1, "height": 1}, "age": 3, "gender": "female"}"#;
        let face: FaceAnalysis = serde_json::from_str(json).unwrap();
        assert_relative_eq!(face.score, 1.0);
        assert!(face.landmarks.is_empty());
        assert!(face.expressions.is_empty());
    }
}
