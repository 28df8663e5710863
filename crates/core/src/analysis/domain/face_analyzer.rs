use std::path::PathBuf;

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::loading::domain::model_stage::ModelStage;
use crate::shared::frame::Frame;

/// Domain interface for the face detection/landmark/expression/age-gender
/// capability.
///
/// Stages are always loaded in [`ModelStage::ALL`] order, so a stage may
/// rely on every earlier stage being initialized. `analyze` is only called
/// after all stages loaded successfully.
pub trait FaceAnalyzer: Send {
    fn load_stage(
        &mut self,
        stage: ModelStage,
        files: &[PathBuf],
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Boxes, landmarks, expression scores and age/gender for every face,
    /// in the analyzer's native order.
    fn analyze(&mut self, frame: &Frame) -> Result<Vec<FaceAnalysis>, Box<dyn std::error::Error>>;
}
