//! churn-model: telecom churn prediction pipeline.
//!
//! Training turns processed customer rows into an [`ArtifactBundle`]: a
//! categorical encoding registry, a feature normalizer and a gradient boosted
//! classifier fitted together and persisted as one file. Inference loads the
//! bundle once and replays the same encode, synthesize and normalize steps on
//! each incoming record to produce a churn probability, a 0/1 label and a
//! risk tier.
//!
//! The bundle is the only channel between the two halves; its components are
//! never saved, loaded or swapped separately.
pub mod bundle;
pub mod config;
pub mod data_handling;
pub mod encoding;
pub mod error;
pub mod features;
pub mod inference;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod schema;
pub mod stats;
pub mod trainer;

pub use bundle::ArtifactBundle;
pub use config::{ModelConfig, TrainConfig};
pub use data_handling::{DatasetSummary, LabeledRecord};
pub use encoding::EncodingRegistry;
pub use error::{PipelineError, Result};
pub use inference::{predict, predict_batch, predict_json, PredictionResult, RiskTier};
pub use preprocessing::Normalizer;
pub use schema::{Attribute, CustomerRecord};
pub use trainer::{train, TrainingOutcome, TrainingReport};
