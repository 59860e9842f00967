//! Single-record churn prediction from a loaded [`ArtifactBundle`].
//!
//! `predict` replays exactly the training transformation (encode with the
//! bundled registry, synthesize interaction features, normalize with the
//! bundled normalizer) and queries the bundled classifier. It holds no state
//! between calls, so any number of predictions may run concurrently against
//! one shared bundle.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bundle::ArtifactBundle;
use crate::error::Result;
use crate::features::featurize;
use crate::models::ClassifierModel;
use crate::schema::CustomerRecord;

/// Probability at or above which a customer is labeled as churning.
pub const LABEL_THRESHOLD: f64 = 0.5;
/// Lower edge (inclusive) of the High tier.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Lower edge (inclusive) of the Medium tier.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Bucket a probability: `[0, 0.4)` Low, `[0.4, 0.7)` Medium, `[0.7, 1]` High.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    /// 1 when `probability >= 0.5`, else 0.
    pub label: u8,
    pub risk_tier: RiskTier,
}

impl PredictionResult {
    pub fn from_probability(probability: f64) -> Self {
        PredictionResult {
            probability,
            label: u8::from(probability >= LABEL_THRESHOLD),
            risk_tier: RiskTier::from_probability(probability),
        }
    }
}

/// Predict churn for one record.
///
/// Fails with `UnknownCategory` when a categorical value was never seen at
/// training time and with `SchemaMismatch` when the bundle's components
/// disagree with the record's feature vector.
pub fn predict(record: &CustomerRecord, bundle: &ArtifactBundle) -> Result<PredictionResult> {
    let features = featurize(record, bundle.registry())?;
    let normalized = bundle.normalizer().transform(&features)?;
    let probability = bundle.classifier().predict_proba_row(&normalized)?;
    Ok(PredictionResult::from_probability(probability))
}

/// Parse a JSON record at the serving boundary and predict it.
pub fn predict_json(json: &str, bundle: &ArtifactBundle) -> Result<PredictionResult> {
    let record = CustomerRecord::from_json(json)?;
    predict(&record, bundle)
}

/// Predict many independent records in parallel.
///
/// Element `i` of the output is exactly `predict(&records[i], bundle)`.
pub fn predict_batch(records: &[CustomerRecord], bundle: &ArtifactBundle) -> Vec<Result<PredictionResult>> {
    records.par_iter().map(|record| predict(record, bundle)).collect()
}
