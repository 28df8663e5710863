pub mod expression_scores;
pub mod face_analysis;
pub mod face_analyzer;
pub mod face_landmarks;
pub mod latest_result;
