//! Evaluation metrics for the binary churn classifier.
//!
//! All functions take 0/1 labels (1 = churned) and are observability only:
//! nothing in training is gated on them.
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Area under the ROC curve.
///
/// Computed with the rank statistic (Mann-Whitney U), giving tied scores
/// their average rank. This is exactly the trapezoidal area under the ROC
/// curve.
///
/// # Arguments
///
/// * `scores` - Predicted churn probabilities (higher = more likely to churn).
/// * `labels` - True labels, same length as `scores`.
///
/// # Returns
///
/// The AUC in [0, 1], or an error when the lengths differ or only one class
/// is present (the AUC is undefined then).
pub fn roc_auc(scores: &[f64], labels: &[u8]) -> Result<f64> {
    if scores.len() != labels.len() {
        return Err(PipelineError::InvalidDataset(format!(
            "scores and labels must have equal lengths ({} vs {})",
            scores.len(),
            labels.len()
        )));
    }
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(PipelineError::InvalidDataset(
            "ROC-AUC is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based average ranks over runs of tied scores
    let mut ranks = vec![0.0f64; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg_rank;
        }
        start = end;
    }

    let pos_rank_sum: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|(_, l)| **l == 1)
        .map(|(r, _)| r)
        .sum();
    let n_pos_f = n_pos as f64;
    let u = pos_rank_sum - n_pos_f * (n_pos_f + 1.0) / 2.0;
    Ok(u / (n_pos_f * n_neg as f64))
}

/// Counts of a binary confusion matrix with 1 as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(predicted: &[u8], labels: &[u8]) -> Result<Self> {
        if predicted.len() != labels.len() {
            return Err(PipelineError::InvalidDataset(format!(
                "predictions and labels must have equal lengths ({} vs {})",
                predicted.len(),
                labels.len()
            )));
        }
        let mut cm = ConfusionMatrix::default();
        for (&p, &l) in predicted.iter().zip(labels) {
            match (p == 1, l == 1) {
                (true, true) => cm.true_positive += 1,
                (true, false) => cm.false_positive += 1,
                (false, false) => cm.true_negative += 1,
                (false, true) => cm.false_negative += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Metrics treating `positive` (0 or 1) as the positive class.
    pub fn class_metrics(&self, positive: u8) -> ClassMetrics {
        let (tp, fp, fn_) = if positive == 1 {
            (self.true_positive, self.false_positive, self.false_negative)
        } else {
            (self.true_negative, self.false_negative, self.false_positive)
        };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        ClassMetrics {
            label: positive,
            precision,
            recall,
            f1: f1_score(precision, recall),
            support: tp + fn_,
        }
    }
}

/// Precision, recall, F1 and support for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class breakdown of held-out predictions, in the spirit of a
/// classification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion: ConfusionMatrix,
    pub retained: ClassMetrics,
    pub churned: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    pub fn new(predicted: &[u8], labels: &[u8]) -> Result<Self> {
        let confusion = ConfusionMatrix::from_predictions(predicted, labels)?;
        Ok(ClassificationReport {
            confusion,
            retained: confusion.class_metrics(0),
            churned: confusion.class_metrics(1),
            accuracy: confusion.accuracy(),
        })
    }
}

impl std::fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:>10} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        for m in [&self.retained, &self.churned] {
            writeln!(
                f,
                "{:>10} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        write!(
            f,
            "{:>10} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.confusion.total()
        )
    }
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
