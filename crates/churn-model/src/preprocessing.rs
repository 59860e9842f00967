//! Per-feature standardization of the synthesized feature vector.
//!
//! A [`Normalizer`] is fitted once over the full training feature matrix and
//! then applied, unchanged, to every vector the classifier sees. It must run
//! after feature synthesis, never on the raw base vector.
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{PipelineError, Result};

/// Per-column mean and population standard deviation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl Normalizer {
    /// Fit from a matrix where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 || ncols == 0 {
            return Err(PipelineError::InvalidDataset(
                "normalizer requires a non-empty feature matrix".to_string(),
            ));
        }

        let mut mean = Vec::with_capacity(ncols);
        let mut std = Vec::with_capacity(ncols);
        for column in x.columns() {
            if column.iter().any(|v| !v.is_finite()) {
                return Err(PipelineError::InvalidDataset(format!(
                    "feature column {} contains non-finite values",
                    mean.len()
                )));
            }
            let first = column[0];
            if column.iter().all(|&v| v == first) {
                mean.push(first);
                std.push(0.0);
            } else {
                mean.push(column.iter().mean());
                std.push(column.iter().population_std_dev());
            }
        }

        let constant = std.iter().filter(|&&s| s == 0.0).count();
        if constant > 0 {
            log::debug!("{} of {} feature columns are constant, using identity scaling", constant, ncols);
        }

        Ok(Normalizer { mean, std })
    }

    /// Number of features the normalizer was fitted on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted standard deviations; zero for constant columns.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    #[inline]
    fn scale(&self, col: usize) -> f64 {
        if self.std[col] == 0.0 {
            1.0
        } else {
            self.std[col]
        }
    }

    /// Standardize one feature vector: `(x - mean) / std` per column, with
    /// `std = 1` for columns that were constant at fit time.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.width() {
            return Err(PipelineError::SchemaMismatch(format!(
                "feature vector has {} values, normalizer was fitted on {}",
                features.len(),
                self.width()
            )));
        }
        Ok(features
            .iter()
            .enumerate()
            .map(|(c, &v)| (v - self.mean[c]) / self.scale(c))
            .collect())
    }

    /// Standardize every row of a matrix.
    pub fn transform_matrix(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.width() {
            return Err(PipelineError::SchemaMismatch(format!(
                "feature matrix has {} columns, normalizer was fitted on {}",
                x.ncols(),
                self.width()
            )));
        }
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[c]) / self.scale(c);
            }
        }
        Ok(out)
    }

    pub(crate) fn check_width(&self, expected: usize) -> std::result::Result<(), String> {
        if self.mean.len() != expected || self.std.len() != expected {
            return Err(format!(
                "normalizer covers {} means and {} deviations, expected {}",
                self.mean.len(),
                self.std.len(),
                expected
            ));
        }
        if self.std.iter().any(|s| !s.is_finite() || *s < 0.0) || self.mean.iter().any(|m| !m.is_finite()) {
            return Err("normalizer holds non-finite statistics".to_string());
        }
        Ok(())
    }
}

/// Fit a normalizer and return it together with the transformed matrix.
pub fn fit_transform(x: &Array2<f64>) -> Result<(Normalizer, Array2<f64>)> {
    let normalizer = Normalizer::fit(x)?;
    let transformed = normalizer.transform_matrix(x)?;
    Ok((normalizer, transformed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_computes_mean_and_population_std() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0]).unwrap();
        let normalizer = Normalizer::fit(&x).unwrap();
        assert!((normalizer.mean()[0] - 2.5).abs() < 1e-12);
        assert!((normalizer.mean()[1] - 25.0).abs() < 1e-12);
        assert!((normalizer.std()[0] - 1.25f64.sqrt()).abs() < 1e-12);
        assert!((normalizer.std()[1] - 125f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn transformed_columns_have_zero_mean_unit_variance() {
        let x = Array2::from_shape_vec((5, 1), vec![3.0, 7.0, 1.0, 9.0, 5.0]).unwrap();
        let (_, t) = fit_transform(&x).unwrap();
        let n = t.nrows() as f64;
        let mean: f64 = t.column(0).iter().sum::<f64>() / n;
        let var: f64 = t.column(0).iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12, "mean = {}", mean);
        assert!((var - 1.0).abs() < 1e-12, "var = {}", var);
    }

    #[test]
    fn constant_column_uses_identity_scaling() {
        let x = Array2::from_shape_vec((3, 2), vec![0.1, 1.0, 0.1, 2.0, 0.1, 3.0]).unwrap();
        let normalizer = Normalizer::fit(&x).unwrap();
        assert_eq!(normalizer.std()[0], 0.0);

        let out = normalizer.transform(&[0.1, 2.0]).unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out.iter().all(|v| v.is_finite()));

        // identity scaling: off-constant values are only centred
        let out = normalizer.transform(&[1.1, 2.0]).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let x = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let normalizer = Normalizer::fit(&x).unwrap();
        assert!(matches!(
            normalizer.transform(&[1.0]),
            Err(PipelineError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn transform_matrix_matches_row_transform() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 5.0, 2.0, 7.0, 6.0, 9.0]).unwrap();
        let (normalizer, t) = fit_transform(&x).unwrap();
        for r in 0..x.nrows() {
            let row = normalizer.transform(&x.row(r).to_vec()).unwrap();
            assert_eq!(row, t.row(r).to_vec());
        }
    }

    #[test]
    fn fit_rejects_empty_and_non_finite_input() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(Normalizer::fit(&empty).is_err());
        let nan = Array2::from_shape_vec((2, 1), vec![1.0, f64::NAN]).unwrap();
        assert!(Normalizer::fit(&nan).is_err());
    }
}
