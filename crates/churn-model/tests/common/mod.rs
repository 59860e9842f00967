#![allow(dead_code)]

use churn_model::{CustomerRecord, LabeledRecord, ModelConfig, TrainConfig};

const RETAINED_PAYMENTS: [&str; 3] = [
    "Bank transfer (automatic)",
    "Credit card (automatic)",
    "Mailed check",
];

/// Deterministic synthetic dataset of `n` rows where every third customer
/// churns. Churners are short-tenure month-to-month fiber customers paying
/// by electronic check; everyone else is on a long contract.
pub fn synthetic_rows(n: usize) -> Vec<LabeledRecord> {
    (0..n)
        .map(|i| {
            let churn = i % 3 == 0;
            let record = if churn {
                churner(i)
            } else {
                loyal(i)
            };
            LabeledRecord {
                record,
                churn: churn as u8,
            }
        })
        .collect()
}

fn base(i: usize) -> CustomerRecord {
    let has_phone = i % 7 != 0;
    CustomerRecord {
        gender: if i % 2 == 0 { "Female" } else { "Male" }.into(),
        senior_citizen: if i % 5 == 0 { "Yes" } else { "No" }.into(),
        partner: if i % 2 == 1 { "Yes" } else { "No" }.into(),
        dependents: if i % 4 == 0 { "Yes" } else { "No" }.into(),
        tenure: 0,
        phone_service: if has_phone { "Yes" } else { "No" }.into(),
        multiple_lines: match (has_phone, i % 2) {
            (false, _) => "No phone service",
            (true, 0) => "Yes",
            (true, _) => "No",
        }
        .into(),
        internet_service: String::new(),
        online_security: String::new(),
        online_backup: if i % 3 == 1 { "Yes" } else { "No" }.into(),
        device_protection: if i % 4 == 1 { "Yes" } else { "No" }.into(),
        tech_support: String::new(),
        streaming_tv: if i % 2 == 0 { "Yes" } else { "No" }.into(),
        streaming_movies: if i % 5 == 1 { "Yes" } else { "No" }.into(),
        contract: String::new(),
        paperless_billing: if i % 3 == 0 { "Yes" } else { "No" }.into(),
        payment_method: String::new(),
        monthly_charges: 0.0,
        total_charges: 0.0,
    }
}

fn churner(i: usize) -> CustomerRecord {
    let tenure = 1 + (i % 12) as u32;
    let monthly = 70.0 + (i % 20) as f64;
    CustomerRecord {
        tenure,
        internet_service: "Fiber optic".into(),
        online_security: "No".into(),
        tech_support: "No".into(),
        contract: "Month-to-month".into(),
        payment_method: "Electronic check".into(),
        monthly_charges: monthly,
        total_charges: monthly * tenure as f64,
        ..base(i)
    }
}

fn loyal(i: usize) -> CustomerRecord {
    let tenure = 30 + (i % 40) as u32;
    let monthly = 20.0 + (i % 30) as f64;
    CustomerRecord {
        tenure,
        internet_service: "DSL".into(),
        online_security: if i % 2 == 0 { "Yes" } else { "No" }.into(),
        tech_support: if i % 2 == 1 { "Yes" } else { "No" }.into(),
        contract: if i % 2 == 0 { "Two year" } else { "One year" }.into(),
        payment_method: RETAINED_PAYMENTS[i % RETAINED_PAYMENTS.len()].into(),
        monthly_charges: monthly,
        total_charges: monthly * tenure as f64,
        ..base(i)
    }
}

/// A customer matching the churn profile of [`synthetic_rows`].
pub fn likely_churner() -> CustomerRecord {
    churner(3)
}

/// A customer matching the retained profile of [`synthetic_rows`].
pub fn likely_loyal() -> CustomerRecord {
    CustomerRecord {
        tenure: 60,
        total_charges: 60.0 * 25.0,
        monthly_charges: 25.0,
        ..loyal(4)
    }
}

/// Small and fast hyper-parameters with full-row sampling.
pub fn fast_config() -> TrainConfig {
    TrainConfig {
        model: ModelConfig {
            n_estimators: 50,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 4,
            min_samples_leaf: 2,
            subsample: 1.0,
            ..ModelConfig::default()
        },
        ..TrainConfig::default()
    }
}
