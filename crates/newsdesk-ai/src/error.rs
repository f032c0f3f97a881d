use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model artifact not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("failed to load {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("classifier head produces {found} scores, expected {expected}")]
    IncompatibleHead { expected: usize, found: usize },

    #[error("model loader did not complete: {0}")]
    LoaderAborted(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("text produced no content tokens")]
    EmptyInput,
}

impl ClassifierError {
    /// Errors raised while constructing the classifier. These abort startup.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::ArtifactMissing(_)
                | Self::ModelLoad { .. }
                | Self::IncompatibleHead { .. }
                | Self::LoaderAborted(_)
        )
    }
}
