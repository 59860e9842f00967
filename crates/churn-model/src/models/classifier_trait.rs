use ndarray::Array2;

use crate::error::Result;

/// Contract shared by the churn classifiers.
///
/// Labels use the 0/1 churn convention (1 = churned). Prediction takes
/// `&self` so a fitted model can be queried from many threads at once.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model on normalized features `x` and 0/1 labels `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()>;

    /// Churn probability (0..=1) for every row of `x`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>>;

    /// Churn probability for a single normalized feature vector.
    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec()).map_err(|e| {
            crate::error::PipelineError::SchemaMismatch(format!("feature row shape: {}", e))
        })?;
        let probs = self.predict_proba(&x)?;
        Ok(probs[0])
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
