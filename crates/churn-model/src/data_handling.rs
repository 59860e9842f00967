//! Labeled training rows, dataset summaries and stratified partitioning.
//!
//! Splits and folds are seeded so that a training run is reproducible for a
//! given input order. Both keep the churn/retained proportion of the full
//! dataset in every partition.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::CustomerRecord;

/// One processed dataset row: the customer and whether they churned (1) or not (0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub record: CustomerRecord,
    pub churn: u8,
}

/// Business aggregates over a labeled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_customers: usize,
    pub churned_customers: usize,
    /// Percentage of churned customers (0..=100).
    pub churn_rate: f64,
    pub avg_monthly_charges: f64,
    pub avg_tenure: f64,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[LabeledRecord]) -> Self {
        let total = rows.len();
        let churned = rows.iter().filter(|r| r.churn == 1).count();
        let mean = |sum: f64| if total == 0 { 0.0 } else { sum / total as f64 };
        DatasetSummary {
            total_customers: total,
            churned_customers: churned,
            churn_rate: mean(churned as f64) * 100.0,
            avg_monthly_charges: mean(rows.iter().map(|r| r.record.monthly_charges).sum()),
            avg_tenure: mean(rows.iter().map(|r| r.record.tenure as f64).sum()),
        }
    }

    pub fn log_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} customers, {} churned ({:.2}%)",
            self.total_customers,
            self.churned_customers,
            self.churn_rate
        );
        log::info!(
            "Average monthly charges {:.2}, average tenure {:.2} months",
            self.avg_monthly_charges,
            self.avg_tenure
        );
        log::info!("------------------------------");
    }
}

/// Row indices of each class: `(retained, churned)`.
pub fn class_indices(labels: &[u8]) -> (Vec<usize>, Vec<usize>) {
    let retained = (0..labels.len()).filter(|&i| labels[i] == 0).collect();
    let churned = (0..labels.len()).filter(|&i| labels[i] == 1).collect();
    (retained, churned)
}

/// Stratified train/test split.
///
/// Each class contributes `round(n_class * test_size)` rows to the test
/// partition, clamped so both partitions keep at least one row of every
/// class. Returns sorted `(train, test)` row indices.
///
/// # Arguments
///
/// * `labels` - 0/1 labels, one per row.
/// * `test_size` - Fraction of rows to hold out, in (0, 1).
/// * `seed` - Seed for the shuffle inside each class.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    let (retained, churned) = class_indices(labels);
    for (name, mut members) in [("retained", retained), ("churned", churned)] {
        if members.len() < 2 {
            return Err(PipelineError::InvalidDataset(format!(
                "stratified split needs at least 2 {} rows, found {}",
                name,
                members.len()
            )));
        }
        members.shuffle(&mut rng);
        let n_test = ((members.len() as f64 * test_size).round() as usize).clamp(1, members.len() - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Stratified k-fold partition.
///
/// Rows of each class are shuffled and dealt round-robin over the folds, so
/// every fold's test part holds `n_class / k` (rounded either way) rows of
/// each class. Returns `(train, test)` index pairs, one per fold.
pub fn stratified_k_fold(labels: &[u8], n_folds: usize, seed: u64) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if n_folds < 2 {
        return Err(PipelineError::InvalidConfig(format!(
            "cross-validation needs at least 2 folds, got {}",
            n_folds
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fold_of = vec![0usize; labels.len()];

    let (retained, churned) = class_indices(labels);
    for (name, mut members) in [("retained", retained), ("churned", churned)] {
        if members.len() < n_folds {
            return Err(PipelineError::InvalidDataset(format!(
                "{}-fold cross-validation needs at least {} {} rows, found {}",
                n_folds,
                n_folds,
                name,
                members.len()
            )));
        }
        members.shuffle(&mut rng);
        for (i, &row) in members.iter().enumerate() {
            fold_of[row] = i % n_folds;
        }
    }

    Ok((0..n_folds)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) = (0..labels.len()).partition(|&i| fold_of[i] == fold);
            (train, test)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_retained: usize, n_churned: usize) -> Vec<u8> {
        let mut y = vec![0u8; n_retained];
        y.extend(vec![1u8; n_churned]);
        y
    }

    #[test]
    fn split_preserves_class_proportions() {
        let y = labels(80, 20);
        let (train, test) = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
        assert_eq!(test.iter().filter(|&&i| y[i] == 1).count(), 4);
        assert_eq!(train.iter().filter(|&&i| y[i] == 1).count(), 16);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let y = labels(30, 30);
        assert_eq!(stratified_split(&y, 0.2, 7).unwrap(), stratified_split(&y, 0.2, 7).unwrap());
    }

    #[test]
    fn split_keeps_every_class_in_both_partitions() {
        let y = labels(50, 2);
        let (train, test) = stratified_split(&y, 0.1, 1).unwrap();
        assert_eq!(test.iter().filter(|&&i| y[i] == 1).count(), 1);
        assert_eq!(train.iter().filter(|&&i| y[i] == 1).count(), 1);
    }

    #[test]
    fn split_rejects_single_class() {
        assert!(stratified_split(&labels(10, 1), 0.2, 1).is_err());
        assert!(stratified_split(&labels(10, 10), 0.0, 1).is_err());
    }

    #[test]
    fn folds_partition_rows_and_stratify() {
        let y = labels(25, 10);
        let folds = stratified_k_fold(&y, 5, 42).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0usize; y.len()];
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), y.len());
            assert_eq!(test.iter().filter(|&&i| y[i] == 1).count(), 2);
            assert_eq!(test.iter().filter(|&&i| y[i] == 0).count(), 5);
            for &i in test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1), "every row is tested exactly once");
    }

    #[test]
    fn folds_need_enough_rows_per_class() {
        assert!(stratified_k_fold(&labels(10, 3), 5, 0).is_err());
        assert!(stratified_k_fold(&labels(10, 10), 1, 0).is_err());
    }
}
