use std::path::PathBuf;

/// Errors raised by the churn pipeline.
///
/// Every error is local to one prediction or one training run. None of them
/// leaves a registry, normalizer or bundle partially updated.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A categorical value that was never seen when the registry was fitted.
    #[error("unknown category '{value}' for attribute '{attribute}'")]
    UnknownCategory { attribute: String, value: String },

    /// Record shape or feature width disagrees with what the bundle expects.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Bundle missing, truncated, corrupt or built against another schema.
    #[error("failed to load artifact bundle {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("failed to save artifact bundle {path}: {source}")]
    ArtifactSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model has not been fitted")]
    ModelNotFitted,

    /// The classifier produced an undefined output for a row.
    #[error("invalid prediction: {0}")]
    InvalidPrediction(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn artifact_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
