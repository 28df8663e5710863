//! Face analyzer that replays recorded detections.
//!
//! Stands in for the neural model backend: each `analyze` call returns the
//! next per-frame detection set from a JSON script, cycling when the end
//! is reached. Stage loading still enforces the real backend's contract
//! (fixed order, files present on disk) so loader failures are observable.
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::loading::domain::model_stage::ModelStage;
use crate::shared::frame::Frame;

pub struct ScriptedFaceAnalyzer {
    script: Vec<Vec<FaceAnalysis>>,
    cursor: usize,
    loaded: Vec<ModelStage>,
    check_files: bool,
}

impl ScriptedFaceAnalyzer {
    pub fn new(script: Vec<Vec<FaceAnalysis>>) -> Self {
        Self {
            script,
            cursor: 0,
            loaded: Vec::new(),
            check_files: true,
        }
    }

    /// Parses a script: a JSON array with one array of faces per frame.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read detection script {}: {e}", path.display()))?;
        Ok(Self::from_json(&json)?)
    }

    /// Accept stage files without checking that they exist.
    pub fn without_file_checks(mut self) -> Self {
        self.check_files = false;
        self
    }

    pub fn loaded_stages(&self) -> &[ModelStage] {
        &self.loaded
    }

    fn is_fully_loaded(&self) -> bool {
        self.loaded.len() == ModelStage::ALL.len()
    }
}

impl FaceAnalyzer for ScriptedFaceAnalyzer {
    fn load_stage(
        &mut self,
        stage: ModelStage,
        files: &[PathBuf],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let expected = ModelStage::ALL.get(self.loaded.len()).copied();
        if expected != Some(stage) {
            return Err(format!("{stage} model loaded out of order").into());
        }
        if files.is_empty() {
            return Err(format!("{stage} model has no files").into());
        }
        if self.check_files {
            if let Some(missing) = files.iter().find(|f| !f.is_file()) {
                return Err(format!("{stage} model file missing: {}", missing.display()).into());
            }
        }
        self.loaded.push(stage);
        Ok(())
    }

    fn analyze(&mut self, _frame: &Frame) -> Result<Vec<FaceAnalysis>, Box<dyn std::error::Error>> {
        if !self.is_fully_loaded() {
            return Err("analyzer used before all models loaded".into());
        }
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        let faces = self.script[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.script.len();
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        [{"box": {"x": 1, "y": 1, "width": 4, "height": 4},
          "expressions": {"happy": 0.9}, "age": 31.0, "gender": "male"}],
        []
    ]"#;

    fn frame() -> Frame {
        Frame::new(vec![0; 8 * 8 * 3], 8, 8, 3, 0)
    }

    fn load_all(analyzer: &mut ScriptedFaceAnalyzer) {
        for stage in ModelStage::ALL {
            analyzer
                .load_stage(stage, &[PathBuf::from(stage.file_stem())])
                .unwrap();
        }
    }

    #[test]
    fn test_replays_script_cyclically() {
        let mut analyzer = ScriptedFaceAnalyzer::from_json(SCRIPT)
            .unwrap()
            .without_file_checks();
        load_all(&mut analyzer);

        let counts: Vec<usize> = (0..4)
            .map(|_| analyzer.analyze(&frame()).unwrap().len())
            .collect();

        assert_eq!(counts, vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_refuses_to_analyze_before_loading() {
        let mut analyzer = ScriptedFaceAnalyzer::from_json(SCRIPT).unwrap();
        assert!(analyzer.analyze(&frame()).is_err());
    }

    #[test]
    fn test_rejects_out_of_order_stage() {
        let mut analyzer = ScriptedFaceAnalyzer::new(vec![]).without_file_checks();
        let err = analyzer
            .load_stage(ModelStage::AgeGender, &[PathBuf::from("x")])
            .unwrap_err();
        assert!(err.to_string().contains("out of order"));
        assert!(analyzer.loaded_stages().is_empty());
    }

    #[test]
    fn test_missing_stage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = ScriptedFaceAnalyzer::new(vec![]);
        let result =
            analyzer.load_stage(ModelStage::TinyFaceDetector, &[dir.path().join("absent.bin")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_existing_stage_files_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny_face_detector_model.bin");
        fs::write(&path, b"weights").unwrap();
        let mut analyzer = ScriptedFaceAnalyzer::new(vec![]);

        analyzer
            .load_stage(ModelStage::TinyFaceDetector, &[path])
            .unwrap();

        assert_eq!(analyzer.loaded_stages(), &[ModelStage::TinyFaceDetector]);
    }

    #[test]
    fn test_empty_script_yields_no_faces() {
        let mut analyzer = ScriptedFaceAnalyzer::new(vec![]).without_file_checks();
        load_all(&mut analyzer);
        assert!(analyzer.analyze(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_from_path_reports_unreadable_file() {
        let err = ScriptedFaceAnalyzer::from_path(Path::new("/nonexistent/script.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("detection script"));
    }
}
