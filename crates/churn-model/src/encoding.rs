//! Label encoding of categorical attributes.
//!
//! An [`EncodingRegistry`] holds one [`CategoryEncoder`] per categorical
//! attribute. Codes are assigned in first-observed order while scanning the
//! training rows, so the same rows in the same order always produce the same
//! registry. Once fitted a registry is never mutated; re-fitting yields a new
//! registry whose codes are not interchangeable with the old one.
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::{Attribute, AttributeValue, CustomerRecord, ATTRIBUTES, ATTRIBUTE_COUNT};

/// Bijection between the observed values of one attribute and integer codes.
///
/// The code of a class is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    attribute: Attribute,
    classes: Vec<String>,
}

impl CategoryEncoder {
    fn new(attribute: Attribute) -> Self {
        CategoryEncoder {
            attribute,
            classes: Vec::new(),
        }
    }

    fn observe(&mut self, value: &str) {
        if !self.classes.iter().any(|c| c == value) {
            self.classes.push(value.to_string());
        }
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn code(&self, value: &str) -> Option<u32> {
        self.classes.iter().position(|c| c == value).map(|i| i as u32)
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingRegistry {
    encoders: Vec<CategoryEncoder>,
}

impl EncodingRegistry {
    /// Fit one encoder per categorical attribute from the training rows.
    pub fn fit<'a, I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a CustomerRecord>,
    {
        let mut encoders: Vec<CategoryEncoder> = Attribute::categorical().map(CategoryEncoder::new).collect();
        let mut n_rows = 0usize;

        for record in rows {
            for encoder in encoders.iter_mut() {
                if let AttributeValue::Categorical(value) = record.value(encoder.attribute) {
                    encoder.observe(value);
                }
            }
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(PipelineError::InvalidDataset(
                "cannot fit encoders on an empty dataset".to_string(),
            ));
        }

        for encoder in &encoders {
            log::debug!(
                "Encoder for {}: {} classes {:?}",
                encoder.attribute,
                encoder.classes.len(),
                encoder.classes
            );
        }

        Ok(EncodingRegistry { encoders })
    }

    pub fn encoder(&self, attr: Attribute) -> Option<&CategoryEncoder> {
        self.encoders.iter().find(|e| e.attribute == attr)
    }

    pub fn encoders(&self) -> &[CategoryEncoder] {
        &self.encoders
    }

    /// Code of `value` for `attr`.
    pub fn code(&self, attr: Attribute, value: &str) -> Result<u32> {
        let encoder = self.encoder(attr).ok_or_else(|| {
            PipelineError::SchemaMismatch(format!("registry has no encoder for attribute '{}'", attr))
        })?;
        encoder.code(value).ok_or_else(|| PipelineError::UnknownCategory {
            attribute: attr.name().to_string(),
            value: value.to_string(),
        })
    }

    /// Replace every categorical value of `record` with its code.
    ///
    /// Returns the base vector in schema order; numeric attributes pass
    /// through unchanged.
    pub fn encode(&self, record: &CustomerRecord) -> Result<Vec<f64>> {
        let mut base = Vec::with_capacity(ATTRIBUTE_COUNT);
        for attr in ATTRIBUTES {
            let v = match record.value(attr) {
                AttributeValue::Categorical(value) => self.code(attr, value)? as f64,
                AttributeValue::Numeric(v) => v,
            };
            base.push(v);
        }
        Ok(base)
    }

    /// Check that the registry covers exactly the categorical attributes of
    /// the compiled schema, in order, with non-empty and distinct classes.
    pub(crate) fn check_schema(&self) -> std::result::Result<(), String> {
        let expected: Vec<Attribute> = Attribute::categorical().collect();
        let actual: Vec<Attribute> = self.encoders.iter().map(|e| e.attribute).collect();
        if expected != actual {
            return Err(format!(
                "registry encodes {:?}, schema expects {:?}",
                actual, expected
            ));
        }
        for encoder in &self.encoders {
            if encoder.classes.is_empty() {
                return Err(format!("encoder for '{}' has no classes", encoder.attribute));
            }
            for (i, class) in encoder.classes.iter().enumerate() {
                if encoder.classes[..i].contains(class) {
                    return Err(format!(
                        "encoder for '{}' lists class '{}' twice",
                        encoder.attribute, class
                    ));
                }
            }
        }
        Ok(())
    }
}
