use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Loss used by the tree learner; it expects labels in {-1, 1} and predicts
/// probabilities.
const LOSS: &str = "LogLikelyhood";

/// Gradient Boosting Decision Tree (GBDT) churn classifier
#[derive(Serialize, Deserialize)]
pub struct GBDTClassifier {
    params: ModelConfig,
    feature_size: usize,
    model: Option<GBDT>,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            params,
            feature_size: 0,
            model: None,
        }
    }

    pub fn params(&self) -> &ModelConfig {
        &self.params
    }

    /// Width of the feature vectors the model was fitted on (0 before fit).
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn to_data_vec(x: &Array2<f64>, labels: Option<&[u8]>) -> DataVec {
        let mut data = DataVec::with_capacity(x.nrows());
        for (i, row) in x.rows().into_iter().enumerate() {
            let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            let label = match labels {
                Some(y) if y[i] == 1 => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            };
            data.push(Data::new_training_data(features, 1.0, label, None));
        }
        data
    }
}

/// Clamp a learner output to [0, 1]; NaN is an error, never a probability.
fn to_probability(row: usize, raw: f32) -> Result<f64> {
    let p = raw as f64;
    if p.is_nan() {
        return Err(PipelineError::InvalidPrediction(format!(
            "classifier returned NaN for row {}",
            row
        )));
    }
    Ok(p.clamp(0.0, 1.0))
}

impl std::fmt::Debug for GBDTClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GBDTClassifier")
            .field("params", &self.params)
            .field("feature_size", &self.feature_size)
            .field("fitted", &self.model.is_some())
            .finish()
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        self.params.validate()?;
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(PipelineError::InvalidDataset(format!(
                "cannot fit on {} rows with {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if let Some(bad) = y.iter().find(|&&label| label > 1) {
            return Err(PipelineError::InvalidDataset(format!(
                "churn labels must be 0 or 1, got {}",
                bad
            )));
        }

        let feature_size = x.ncols();

        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.n_estimators);
        config.set_min_leaf_size(self.params.effective_min_leaf_size());
        config.set_data_sample_ratio(self.params.subsample);
        config.set_feature_sample_ratio(1.0);
        config.set_debug(self.params.debug);
        config.set_training_optimization_level(self.params.training_optimization_level);
        config.set_loss(LOSS);

        let mut gbdt = GBDT::new(&config);
        let mut train_x = Self::to_data_vec(x, Some(y));

        log::debug!(
            "Fitting GBDT on {} rows x {} features ({} rounds, depth {}, shrinkage {})",
            x.nrows(),
            feature_size,
            self.params.n_estimators,
            self.params.max_depth,
            self.params.learning_rate
        );
        gbdt.fit(&mut train_x);

        self.feature_size = feature_size;
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let model = self.model.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        if x.ncols() != self.feature_size {
            return Err(PipelineError::SchemaMismatch(format!(
                "classifier expects {} features, got {}",
                self.feature_size,
                x.ncols()
            )));
        }
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }

        let test_x = Self::to_data_vec(x, None);
        let predictions = model.predict(&test_x);
        predictions
            .into_iter()
            .enumerate()
            .map(|(row, p)| to_probability(row, p))
            .collect()
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}
