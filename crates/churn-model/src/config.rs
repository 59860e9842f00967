use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Hyper-parameters of the gradient boosted classifier.
///
/// Defaults reproduce the tuned churn model: 300 trees, shrinkage 0.05,
/// depth 5, split/leaf minimums 20/10 and 80% row subsampling.
///
/// The learner draws subsampled rows from an unseeded RNG, so two fits on the
/// same data agree bit for bit only when `subsample` is 1.0.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Ensemble size (boosting rounds).
    pub n_estimators: usize,
    pub learning_rate: f32,
    pub max_depth: u32,
    /// Minimum samples a node needs before it may be split.
    pub min_samples_split: usize,
    /// Minimum samples a leaf must keep.
    pub min_samples_leaf: usize,
    /// Fraction of training rows sampled for each tree. Values below 1.0
    /// make fitting non-deterministic.
    pub subsample: f64,
    pub training_optimization_level: u8,
    pub debug: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            learning_rate: 0.05,
            max_depth: 5,
            min_samples_split: 20,
            min_samples_leaf: 10,
            subsample: 0.8,
            training_optimization_level: 2,
            debug: false,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig("n_estimators must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(PipelineError::InvalidConfig("max_depth must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidConfig("min_samples_split must be at least 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(PipelineError::InvalidConfig("min_samples_leaf must be at least 1".into()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }
        if self.training_optimization_level > 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "training_optimization_level must be 0, 1 or 2, got {}",
                self.training_optimization_level
            )));
        }
        Ok(())
    }

    /// Leaf size handed to the tree learner.
    ///
    /// The learner only exposes a leaf minimum. A node with fewer than
    /// `min_samples_split` rows cannot produce two leaves of
    /// `ceil(min_samples_split / 2)`, so the larger of the two bounds enforces both.
    pub fn effective_min_leaf_size(&self) -> usize {
        self.min_samples_leaf.max(self.min_samples_split.div_ceil(2))
    }
}

/// Settings of one training run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub model: ModelConfig,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Folds for cross-validated ROC-AUC.
    pub cv_folds: usize,
    /// Seed for the stratified split and fold assignment.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            test_size: 0.2,
            cv_folds: 5,
            seed: 42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        Ok(())
    }
}
