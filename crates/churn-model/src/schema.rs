//! Fixed input schema for one subscriber.
//!
//! The 19 attributes are listed in [`ATTRIBUTES`] in the order they occupy
//! in the base feature vector. Sixteen are categorical with a closed,
//! documented domain; `tenure`, `MonthlyCharges` and `TotalCharges` are
//! numeric and pass through encoding unchanged.
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const ATTRIBUTE_COUNT: usize = 19;

/// Upper bound accepted for `tenure` (months) at the serving boundary.
pub const MAX_TENURE_MONTHS: u32 = 100;

const YES_NO: &[&str] = &["Yes", "No"];
const INTERNET_ADDON: &[&str] = &["Yes", "No", "No internet service"];
const GENDERS: &[&str] = &["Male", "Female"];
const MULTIPLE_LINES: &[&str] = &["Yes", "No", "No phone service"];
const INTERNET_SERVICES: &[&str] = &["DSL", "Fiber optic", "No"];
const CONTRACTS: &[&str] = &["Month-to-month", "One year", "Two year"];
const PAYMENT_METHODS: &[&str] = &[
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "SeniorCitizen")]
    SeniorCitizen,
    #[serde(rename = "Partner")]
    Partner,
    #[serde(rename = "Dependents")]
    Dependents,
    #[serde(rename = "tenure")]
    Tenure,
    #[serde(rename = "PhoneService")]
    PhoneService,
    #[serde(rename = "MultipleLines")]
    MultipleLines,
    #[serde(rename = "InternetService")]
    InternetService,
    #[serde(rename = "OnlineSecurity")]
    OnlineSecurity,
    #[serde(rename = "OnlineBackup")]
    OnlineBackup,
    #[serde(rename = "DeviceProtection")]
    DeviceProtection,
    #[serde(rename = "TechSupport")]
    TechSupport,
    #[serde(rename = "StreamingTV")]
    StreamingTv,
    #[serde(rename = "StreamingMovies")]
    StreamingMovies,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "PaperlessBilling")]
    PaperlessBilling,
    #[serde(rename = "PaymentMethod")]
    PaymentMethod,
    #[serde(rename = "MonthlyCharges")]
    MonthlyCharges,
    #[serde(rename = "TotalCharges")]
    TotalCharges,
}

/// All attributes in base vector order.
pub const ATTRIBUTES: [Attribute; ATTRIBUTE_COUNT] = [
    Attribute::Gender,
    Attribute::SeniorCitizen,
    Attribute::Partner,
    Attribute::Dependents,
    Attribute::Tenure,
    Attribute::PhoneService,
    Attribute::MultipleLines,
    Attribute::InternetService,
    Attribute::OnlineSecurity,
    Attribute::OnlineBackup,
    Attribute::DeviceProtection,
    Attribute::TechSupport,
    Attribute::StreamingTv,
    Attribute::StreamingMovies,
    Attribute::Contract,
    Attribute::PaperlessBilling,
    Attribute::PaymentMethod,
    Attribute::MonthlyCharges,
    Attribute::TotalCharges,
];

impl Attribute {
    /// Column name used in datasets, JSON records and bundle headers.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Gender => "gender",
            Attribute::SeniorCitizen => "SeniorCitizen",
            Attribute::Partner => "Partner",
            Attribute::Dependents => "Dependents",
            Attribute::Tenure => "tenure",
            Attribute::PhoneService => "PhoneService",
            Attribute::MultipleLines => "MultipleLines",
            Attribute::InternetService => "InternetService",
            Attribute::OnlineSecurity => "OnlineSecurity",
            Attribute::OnlineBackup => "OnlineBackup",
            Attribute::DeviceProtection => "DeviceProtection",
            Attribute::TechSupport => "TechSupport",
            Attribute::StreamingTv => "StreamingTV",
            Attribute::StreamingMovies => "StreamingMovies",
            Attribute::Contract => "Contract",
            Attribute::PaperlessBilling => "PaperlessBilling",
            Attribute::PaymentMethod => "PaymentMethod",
            Attribute::MonthlyCharges => "MonthlyCharges",
            Attribute::TotalCharges => "TotalCharges",
        }
    }

    /// Position of the attribute in the base feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ATTRIBUTES.iter().copied().find(|a| a.name() == name)
    }

    pub fn is_categorical(self) -> bool {
        self.domain().is_some()
    }

    /// Documented domain of a categorical attribute, `None` for numeric ones.
    pub fn domain(self) -> Option<&'static [&'static str]> {
        match self {
            Attribute::Gender => Some(GENDERS),
            Attribute::SeniorCitizen
            | Attribute::Partner
            | Attribute::Dependents
            | Attribute::PhoneService
            | Attribute::PaperlessBilling => Some(YES_NO),
            Attribute::MultipleLines => Some(MULTIPLE_LINES),
            Attribute::InternetService => Some(INTERNET_SERVICES),
            Attribute::OnlineSecurity
            | Attribute::OnlineBackup
            | Attribute::DeviceProtection
            | Attribute::TechSupport
            | Attribute::StreamingTv
            | Attribute::StreamingMovies => Some(INTERNET_ADDON),
            Attribute::Contract => Some(CONTRACTS),
            Attribute::PaymentMethod => Some(PAYMENT_METHODS),
            Attribute::Tenure | Attribute::MonthlyCharges | Attribute::TotalCharges => None,
        }
    }

    /// Categorical attributes in schema order.
    pub fn categorical() -> impl Iterator<Item = Attribute> {
        ATTRIBUTES.iter().copied().filter(|a| a.is_categorical())
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute names in schema order.
pub fn attribute_names() -> Vec<String> {
    ATTRIBUTES.iter().map(|a| a.name().to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    Categorical(&'a str),
    Numeric(f64),
}

/// One subscriber, as received from the dataset or the serving layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerRecord {
    pub gender: String,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: String,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    pub tenure: u32,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl CustomerRecord {
    /// Parse a record from a JSON object at the serving boundary.
    ///
    /// A missing attribute, an unknown attribute or a value of the wrong type
    /// is reported as [`PipelineError::SchemaMismatch`].
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PipelineError::SchemaMismatch(e.to_string()))
    }

    /// Build a record from a lookup of raw column values keyed by attribute.
    ///
    /// Used by tabular readers; numeric columns must parse, categorical ones
    /// are taken verbatim.
    pub fn from_fields<'a, F>(mut field: F) -> Result<Self>
    where
        F: FnMut(Attribute) -> Option<&'a str>,
    {
        let mut text = |attr: Attribute| -> Result<String> {
            field(attr)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| PipelineError::SchemaMismatch(format!("missing attribute '{}'", attr)))
        };

        let tenure_raw = text(Attribute::Tenure)?;
        let tenure = tenure_raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
            .ok_or_else(|| {
                PipelineError::SchemaMismatch(format!("tenure must be a non-negative integer, got '{}'", tenure_raw))
            })?;

        let mut numeric = |attr: Attribute| -> Result<f64> {
            let raw = text(attr)?;
            raw.parse::<f64>()
                .map_err(|_| PipelineError::SchemaMismatch(format!("{} must be numeric, got '{}'", attr, raw)))
        };
        let monthly_charges = numeric(Attribute::MonthlyCharges)?;
        let total_charges = numeric(Attribute::TotalCharges)?;

        Ok(CustomerRecord {
            gender: text(Attribute::Gender)?,
            senior_citizen: text(Attribute::SeniorCitizen)?,
            partner: text(Attribute::Partner)?,
            dependents: text(Attribute::Dependents)?,
            tenure,
            phone_service: text(Attribute::PhoneService)?,
            multiple_lines: text(Attribute::MultipleLines)?,
            internet_service: text(Attribute::InternetService)?,
            online_security: text(Attribute::OnlineSecurity)?,
            online_backup: text(Attribute::OnlineBackup)?,
            device_protection: text(Attribute::DeviceProtection)?,
            tech_support: text(Attribute::TechSupport)?,
            streaming_tv: text(Attribute::StreamingTv)?,
            streaming_movies: text(Attribute::StreamingMovies)?,
            contract: text(Attribute::Contract)?,
            paperless_billing: text(Attribute::PaperlessBilling)?,
            payment_method: text(Attribute::PaymentMethod)?,
            monthly_charges,
            total_charges,
        })
    }

    pub fn value(&self, attr: Attribute) -> AttributeValue<'_> {
        use AttributeValue::{Categorical, Numeric};
        match attr {
            Attribute::Gender => Categorical(&self.gender),
            Attribute::SeniorCitizen => Categorical(&self.senior_citizen),
            Attribute::Partner => Categorical(&self.partner),
            Attribute::Dependents => Categorical(&self.dependents),
            Attribute::Tenure => Numeric(self.tenure as f64),
            Attribute::PhoneService => Categorical(&self.phone_service),
            Attribute::MultipleLines => Categorical(&self.multiple_lines),
            Attribute::InternetService => Categorical(&self.internet_service),
            Attribute::OnlineSecurity => Categorical(&self.online_security),
            Attribute::OnlineBackup => Categorical(&self.online_backup),
            Attribute::DeviceProtection => Categorical(&self.device_protection),
            Attribute::TechSupport => Categorical(&self.tech_support),
            Attribute::StreamingTv => Categorical(&self.streaming_tv),
            Attribute::StreamingMovies => Categorical(&self.streaming_movies),
            Attribute::Contract => Categorical(&self.contract),
            Attribute::PaperlessBilling => Categorical(&self.paperless_billing),
            Attribute::PaymentMethod => Categorical(&self.payment_method),
            Attribute::MonthlyCharges => Numeric(self.monthly_charges),
            Attribute::TotalCharges => Numeric(self.total_charges),
        }
    }

    /// Check every attribute against its documented domain.
    ///
    /// This is the caller-side validation of the serving layer. The pipeline
    /// does not call it: unknown categories are rejected by the fitted
    /// registry instead.
    pub fn validate(&self) -> Result<()> {
        for attr in ATTRIBUTES {
            if let (AttributeValue::Categorical(v), Some(domain)) = (self.value(attr), attr.domain()) {
                if !domain.contains(&v) {
                    return Err(PipelineError::SchemaMismatch(format!(
                        "{} must be one of {:?}, got '{}'",
                        attr, domain, v
                    )));
                }
            }
        }

        if self.tenure > MAX_TENURE_MONTHS {
            return Err(PipelineError::SchemaMismatch(format!(
                "tenure must be within 0..={}, got {}",
                MAX_TENURE_MONTHS, self.tenure
            )));
        }
        if !(self.monthly_charges.is_finite() && self.monthly_charges > 0.0) {
            return Err(PipelineError::SchemaMismatch(format!(
                "MonthlyCharges must be positive, got {}",
                self.monthly_charges
            )));
        }
        if !(self.total_charges.is_finite() && self.total_charges >= 0.0) {
            return Err(PipelineError::SchemaMismatch(format!(
                "TotalCharges must be non-negative, got {}",
                self.total_charges
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_record() -> CustomerRecord {
        CustomerRecord {
            gender: "Female".into(),
            senior_citizen: "No".into(),
            partner: "Yes".into(),
            dependents: "No".into(),
            tenure: 12,
            phone_service: "Yes".into(),
            multiple_lines: "No".into(),
            internet_service: "Fiber optic".into(),
            online_security: "No".into(),
            online_backup: "Yes".into(),
            device_protection: "No".into(),
            tech_support: "No".into(),
            streaming_tv: "Yes".into(),
            streaming_movies: "No".into(),
            contract: "Month-to-month".into(),
            paperless_billing: "Yes".into(),
            payment_method: "Electronic check".into(),
            monthly_charges: 85.5,
            total_charges: 1026.0,
        }
    }

    #[test]
    fn attributes_are_in_vector_order() {
        for (i, attr) in ATTRIBUTES.iter().enumerate() {
            assert_eq!(attr.index(), i);
            assert_eq!(Attribute::from_name(attr.name()), Some(*attr));
        }
        assert_eq!(Attribute::categorical().count(), 16);
    }

    #[test]
    fn serde_names_match_column_names() {
        for attr in ATTRIBUTES {
            let json = serde_json::to_string(&attr).unwrap();
            assert_eq!(json, format!("\"{}\"", attr.name()));
        }
    }

    #[test]
    fn json_record_round_trips() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"InternetService\":\"Fiber optic\""));
        assert_eq!(CustomerRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn json_missing_attribute_is_schema_mismatch() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value.as_object_mut().unwrap().remove("Contract");
        let err = CustomerRecord::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)), "{err}");
    }

    #[test]
    fn json_extra_attribute_is_schema_mismatch() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .insert("customerID".into(), serde_json::Value::String("0001".into()));
        let err = CustomerRecord::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn from_fields_parses_numeric_columns() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();
        let strings: std::collections::HashMap<String, String> = json
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| {
                let s = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), s)
            })
            .collect();
        let parsed = CustomerRecord::from_fields(|a| strings.get(a.name()).map(|s| s.as_str())).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn from_fields_rejects_fractional_tenure() {
        let err = CustomerRecord::from_fields(|a| match a {
            Attribute::Tenure => Some("1.5"),
            _ => Some("0"),
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn validate_accepts_documented_domains() {
        sample_record().validate().unwrap();
    }

    #[test]
    fn validate_rejects_out_of_domain_values() {
        let mut record = sample_record();
        record.internet_service = "Satellite".into();
        assert!(record.validate().is_err());

        let mut record = sample_record();
        record.tenure = 101;
        assert!(record.validate().is_err());

        let mut record = sample_record();
        record.monthly_charges = 0.0;
        assert!(record.validate().is_err());

        let mut record = sample_record();
        record.total_charges = -1.0;
        assert!(record.validate().is_err());
    }
}
