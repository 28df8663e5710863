use std::fmt;

/// One sub-model of the face analysis capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelStage {
    TinyFaceDetector,
    FaceLandmark68,
    FaceExpression,
    AgeGender,
}

impl ModelStage {
    /// Load order. Later stages assume earlier ones are initialized.
    pub const ALL: [ModelStage; 4] = [
        ModelStage::TinyFaceDetector,
        ModelStage::FaceLandmark68,
        ModelStage::FaceExpression,
        ModelStage::AgeGender,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            ModelStage::TinyFaceDetector => "tiny_face_detector_model",
            ModelStage::FaceLandmark68 => "face_landmark_68_model",
            ModelStage::FaceExpression => "face_expression_model",
            ModelStage::AgeGender => "age_gender_model",
        }
    }

    /// Weight manifest followed by the weight blob.
    pub fn file_names(self) -> [String; 2] {
        let stem = self.file_stem();
        [format!("{stem}.json"), format!("{stem}.bin")]
    }
}

impl fmt::Display for ModelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStage::TinyFaceDetector => write!(f, "face detector"),
            ModelStage::FaceLandmark68 => write!(f, "landmarks"),
            ModelStage::FaceExpression => write!(f, "expressions"),
            ModelStage::AgeGender => write!(f, "age/gender"),
        }
    }
}
