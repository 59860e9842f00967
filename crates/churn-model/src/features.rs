//! Interaction features appended to the encoded base vector.
//!
//! The four derived features multiply encoded codes and numeric attributes:
//!
//! | feature             | formula                                    |
//! |---------------------|--------------------------------------------|
//! | `tenure_contract`   | `tenure * Contract code`                   |
//! | `charges_tenure`    | `MonthlyCharges * tenure`                  |
//! | `internet_security` | `InternetService code * OnlineSecurity code` |
//! | `support_backup`    | `TechSupport code * OnlineBackup code`     |
//!
//! Three of them multiply label codes of unordered categories, so their
//! values depend on the order in which categories were first seen when the
//! registry was fitted. That is kept as is for compatibility with models
//! trained on these features; a differently fitted registry silently changes
//! every derived value, which is why the registry travels in the bundle.
use ndarray::Array2;

use crate::encoding::EncodingRegistry;
use crate::error::{PipelineError, Result};
use crate::schema::{attribute_names, Attribute, CustomerRecord, ATTRIBUTE_COUNT};

pub const DERIVED_FEATURES: [&str; 4] = [
    "tenure_contract",
    "charges_tenure",
    "internet_security",
    "support_backup",
];

/// Width of the synthesized (and normalized) feature vector.
pub const FEATURE_COUNT: usize = ATTRIBUTE_COUNT + DERIVED_FEATURES.len();

/// Feature names in vector order: attributes followed by derived features.
pub fn feature_names() -> Vec<String> {
    let mut names = attribute_names();
    names.extend(DERIVED_FEATURES.iter().map(|s| s.to_string()));
    names
}

/// Append the derived features to an encoded base vector.
pub fn synthesize(base: &[f64]) -> Result<Vec<f64>> {
    if base.len() != ATTRIBUTE_COUNT {
        return Err(PipelineError::SchemaMismatch(format!(
            "base vector has {} values, expected {}",
            base.len(),
            ATTRIBUTE_COUNT
        )));
    }
    let at = |attr: Attribute| base[attr.index()];

    let mut features = Vec::with_capacity(FEATURE_COUNT);
    features.extend_from_slice(base);
    features.push(at(Attribute::Tenure) * at(Attribute::Contract));
    features.push(at(Attribute::MonthlyCharges) * at(Attribute::Tenure));
    features.push(at(Attribute::InternetService) * at(Attribute::OnlineSecurity));
    features.push(at(Attribute::TechSupport) * at(Attribute::OnlineBackup));
    Ok(features)
}

/// Encode and synthesize one record.
pub fn featurize(record: &CustomerRecord, registry: &EncodingRegistry) -> Result<Vec<f64>> {
    let base = registry.encode(record)?;
    synthesize(&base)
}

/// Build the (rows x [`FEATURE_COUNT`]) matrix of synthesized features.
pub fn build_matrix<'a, I>(records: I, registry: &EncodingRegistry) -> Result<Array2<f64>>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut data = Vec::new();
    let mut n_rows = 0usize;
    for record in records {
        data.extend(featurize(record, registry)?);
        n_rows += 1;
    }
    Array2::from_shape_vec((n_rows, FEATURE_COUNT), data)
        .map_err(|e| PipelineError::InvalidDataset(format!("feature matrix shape: {}", e)))
}
