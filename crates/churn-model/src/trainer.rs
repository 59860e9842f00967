//! Training orchestration: fit the encoding registry, normalizer and
//! classifier from labeled rows, evaluate them, and assemble the bundle.
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::bundle::ArtifactBundle;
use crate::config::{ModelConfig, TrainConfig};
use crate::data_handling::{class_indices, stratified_k_fold, stratified_split, DatasetSummary, LabeledRecord};
use crate::encoding::EncodingRegistry;
use crate::error::{PipelineError, Result};
use crate::features::build_matrix;
use crate::inference::LABEL_THRESHOLD;
use crate::models::{ClassifierModel, GBDTClassifier};
use crate::preprocessing::fit_transform;
use crate::stats::{roc_auc, ClassMetrics, ClassificationReport};

/// Held-out evaluation of the bundled classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub roc_auc: f64,
    /// Metrics of the churned class.
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub report: ClassificationReport,
}

/// ROC-AUC of each cross-validation fold with its mean and population std.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub fold_auc: Vec<f64>,
    pub mean_auc: f64,
    pub std_auc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub summary: DatasetSummary,
    pub train_size: usize,
    pub test_size: usize,
    pub holdout: HoldoutMetrics,
    pub cross_validation: CrossValidation,
}

impl TrainingReport {
    pub fn log_report(&self) {
        log::info!("----- Training Report -----");
        log::info!(
            "Held-out ROC-AUC {:.4} on {} rows (trained on {})",
            self.holdout.roc_auc,
            self.test_size,
            self.train_size
        );
        log::info!(
            "Churn precision {:.4}, recall {:.4}, F1 {:.4}",
            self.holdout.precision,
            self.holdout.recall,
            self.holdout.f1
        );
        for line in self.holdout.report.to_string().lines() {
            log::info!("{}", line);
        }
        log::info!(
            "{}-fold CV ROC-AUC {:.4} (+/- {:.4})",
            self.cross_validation.fold_auc.len(),
            self.cross_validation.mean_auc,
            self.cross_validation.std_auc
        );
        log::info!("---------------------------");
    }
}

/// Result of a successful training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    pub report: TrainingReport,
}

/// Train the churn model on labeled rows.
///
/// The registry and normalizer are fitted once over every row. The bundled
/// classifier is fitted on the stratified training partition and evaluated
/// on the held-out one; cross-validation fits fresh classifiers with the same
/// hyper-parameters on the same normalized matrix. Nothing is written to
/// disk, so a failing run leaves any previously saved bundle untouched.
///
/// # Arguments
///
/// * `rows` - Processed dataset rows with 0/1 churn labels.
/// * `config` - Hyper-parameters, split fraction, fold count and seed.
pub fn train(rows: &[LabeledRecord], config: &TrainConfig) -> Result<TrainingOutcome> {
    config.validate()?;
    if config.model.subsample < 1.0 {
        log::warn!(
            "subsample = {} draws unseeded rows per tree; the classifier and CV scores will vary between runs. \
             Set subsample to 1.0 for a reproducible model",
            config.model.subsample
        );
    }
    let labels: Vec<u8> = rows.iter().map(|r| r.churn).collect();
    check_class_balance(&labels, config.cv_folds)?;

    let summary = DatasetSummary::from_rows(rows);
    summary.log_summary();

    let registry = EncodingRegistry::fit(rows.iter().map(|r| &r.record))?;
    log::debug!("Fitted {} category encoders", registry.encoders().len());

    let features = build_matrix(rows.iter().map(|r| &r.record), &registry)?;
    let (normalizer, x) = fit_transform(&features)?;
    log::debug!("Normalized feature matrix: {} x {}", x.nrows(), x.ncols());

    let (train_idx, test_idx) = stratified_split(&labels, config.test_size, config.seed)?;
    log::info!(
        "Split {} rows into {} training and {} held-out rows",
        rows.len(),
        train_idx.len(),
        test_idx.len()
    );

    let (x_train, y_train) = subset(&x, &labels, &train_idx);
    let (x_test, y_test) = subset(&x, &labels, &test_idx);

    let mut classifier = GBDTClassifier::new(config.model.clone());
    log::info!(
        "Fitting {} classifier on {} rows x {} features",
        classifier.name(),
        x_train.nrows(),
        x_train.ncols()
    );
    classifier.fit(&x_train, &y_train)?;
    let holdout = evaluate(&classifier, &x_test, &y_test)?;
    log::info!("Held-out ROC-AUC: {:.4}", holdout.roc_auc);

    let cross_validation = cross_validate(&x, &labels, &config.model, config.cv_folds, config.seed)?;

    let bundle = ArtifactBundle::new(classifier, registry, normalizer)?;
    let report = TrainingReport {
        summary,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        holdout,
        cross_validation,
    };
    report.log_report();

    Ok(TrainingOutcome { bundle, report })
}

fn check_class_balance(labels: &[u8], cv_folds: usize) -> Result<()> {
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(PipelineError::InvalidDataset(format!(
            "churn labels must be 0 or 1, got {}",
            bad
        )));
    }
    let needed = cv_folds.max(2);
    let (retained, churned) = class_indices(labels);
    if retained.len() < needed || churned.len() < needed {
        return Err(PipelineError::InvalidDataset(format!(
            "training needs at least {} retained and {} churned rows, found {} and {}",
            needed,
            needed,
            retained.len(),
            churned.len()
        )));
    }
    Ok(())
}

fn subset(x: &Array2<f64>, labels: &[u8], indices: &[usize]) -> (Array2<f64>, Vec<u8>) {
    (
        x.select(Axis(0), indices),
        indices.iter().map(|&i| labels[i]).collect(),
    )
}

fn evaluate(classifier: &GBDTClassifier, x: &Array2<f64>, y: &[u8]) -> Result<HoldoutMetrics> {
    let probabilities = classifier.predict_proba(x)?;
    let predicted: Vec<u8> = probabilities
        .iter()
        .map(|&p| u8::from(p >= LABEL_THRESHOLD))
        .collect();
    let report = ClassificationReport::new(&predicted, y)?;
    let ClassMetrics {
        precision, recall, f1, ..
    } = report.churned;
    Ok(HoldoutMetrics {
        roc_auc: roc_auc(&probabilities, y)?,
        precision,
        recall,
        f1,
        report,
    })
}

fn cross_validate(
    x: &Array2<f64>,
    labels: &[u8],
    params: &ModelConfig,
    n_folds: usize,
    seed: u64,
) -> Result<CrossValidation> {
    let folds = stratified_k_fold(labels, n_folds, seed)?;
    let mut fold_auc = Vec::with_capacity(folds.len());

    for (fold, (train_idx, test_idx)) in folds.iter().enumerate() {
        let (x_train, y_train) = subset(x, labels, train_idx);
        let (x_test, y_test) = subset(x, labels, test_idx);

        let mut classifier = GBDTClassifier::new(params.clone());
        classifier.fit(&x_train, &y_train)?;
        let auc = roc_auc(&classifier.predict_proba(&x_test)?, &y_test)?;
        log::debug!(
            "Fold {}: trained on {} rows, ROC-AUC {:.4} on {} rows",
            fold,
            train_idx.len(),
            auc,
            test_idx.len()
        );
        fold_auc.push(auc);
    }

    let mean_auc = fold_auc.iter().mean();
    let std_auc = fold_auc.iter().population_std_dev();
    Ok(CrossValidation {
        fold_auc,
        mean_auc,
        std_auc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::sample_record;

    #[test]
    fn rejects_too_few_rows_per_class() {
        let mut rows: Vec<LabeledRecord> = (0..20)
            .map(|_| LabeledRecord {
                record: sample_record(),
                churn: 0,
            })
            .collect();
        rows.extend((0..3).map(|_| LabeledRecord {
            record: sample_record(),
            churn: 1,
        }));
        let err = train(&rows, &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDataset(_)), "{}", err);
    }

    #[test]
    fn rejects_invalid_config_before_fitting() {
        let config = TrainConfig {
            cv_folds: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(train(&[], &config), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn subset_selects_rows_and_labels() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let (xs, ys) = subset(&x, &[0, 1, 0], &[0, 2]);
        assert_eq!(xs.row(1).to_vec(), vec![5.0, 6.0]);
        assert_eq!(ys, vec![0, 0]);
    }
}
