use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::loading::domain::model_resolver::{ModelResolveError, ModelResolver};
use crate::loading::domain::model_stage::ModelStage;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not fetch {stage} model: {source}")]
    Resolve {
        stage: ModelStage,
        #[source]
        source: ModelResolveError,
    },
    #[error("could not initialize {stage} model: {message}")]
    Initialize { stage: ModelStage, message: String },
    #[error("model loading cancelled")]
    Cancelled,
}

/// An analyzer whose every stage loaded successfully.
///
/// Only [`ModelLoader::load`] can produce one, so holding a `ReadyAnalyzer`
/// is proof of readiness.
pub struct ReadyAnalyzer {
    inner: Box<dyn FaceAnalyzer>,
}

impl ReadyAnalyzer {
    pub fn analyze(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceAnalysis>, Box<dyn std::error::Error>> {
        self.inner.analyze(frame)
    }
}

/// Resolves and initializes the analysis sub-models in their fixed order.
pub struct ModelLoader {
    resolver: Box<dyn ModelResolver>,
    cancelled: Arc<AtomicBool>,
}

impl ModelLoader {
    pub fn new(resolver: Box<dyn ModelResolver>) -> Self {
        Self {
            resolver,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that aborts loading before the next stage starts. A stage that
    /// is already running finishes, but its result is dropped.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn load(&self, mut analyzer: Box<dyn FaceAnalyzer>) -> Result<ReadyAnalyzer, LoadError> {
        for stage in ModelStage::ALL {
            self.check_cancelled()?;
            log::info!("Loading {stage} model");

            let files = self.resolve_stage(stage)?;
            self.check_cancelled()?;

            analyzer
                .load_stage(stage, &files)
                .map_err(|e| LoadError::Initialize {
                    stage,
                    message: e.to_string(),
                })?;
        }
        self.check_cancelled()?;
        log::info!("All face analysis models loaded");
        Ok(ReadyAnalyzer { inner: analyzer })
    }

    fn resolve_stage(&self, stage: ModelStage) -> Result<Vec<PathBuf>, LoadError> {
        stage
            .file_names()
            .iter()
            .map(|name| {
                self.resolver
                    .resolve(name)
                    .map_err(|source| LoadError::Resolve { stage, source })
            })
            .collect()
    }

    fn check_cancelled(&self) -> Result<(), LoadError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(LoadError::Cancelled);
        }
        Ok(())
    }
}
