//! Reader for the processed churn dataset (CSV or TSV).
use std::path::Path;

use csv::StringRecord;

use crate::data_handling::LabeledRecord;
use crate::error::{PipelineError, Result};
use crate::schema::{Attribute, CustomerRecord, ATTRIBUTES, ATTRIBUTE_COUNT};

/// Configuration for reading the processed dataset.
#[derive(Debug, Clone)]
pub struct DatasetReaderConfig {
    /// Column holding the 0/1 churn target.
    pub label_column: String,
    /// Field delimiter; `None` picks tab for `.tsv` files and comma otherwise.
    pub delimiter: Option<u8>,
}

impl Default for DatasetReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "Churn".to_string(),
            delimiter: None,
        }
    }
}

/// Read a processed dataset with the default configuration.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledRecord>> {
    read_dataset_with_config(path, &DatasetReaderConfig::default())
}

/// Read a processed dataset into labeled records.
///
/// The header must contain every schema attribute and the label column;
/// extra columns such as `customerID` are ignored.
pub fn read_dataset_with_config<P: AsRef<Path>>(path: P, config: &DatasetReaderConfig) -> Result<Vec<LabeledRecord>> {
    let path = path.as_ref();
    let delimiter = config.delimiter.unwrap_or_else(|| delimiter_for(path));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();

    let label_idx = find_column(&headers, &config.label_column).ok_or_else(|| {
        PipelineError::InvalidDataset(format!(
            "missing label column '{}' in {}",
            config.label_column,
            path.display()
        ))
    })?;

    let mut attribute_idx = [0usize; ATTRIBUTE_COUNT];
    for attr in ATTRIBUTES {
        attribute_idx[attr.index()] = find_column(&headers, attr.name()).ok_or_else(|| {
            PipelineError::InvalidDataset(format!("missing attribute column '{}' in {}", attr, path.display()))
        })?;
    }

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let line = row_idx + 1;
        let row = result?;

        let record = CustomerRecord::from_fields(|attr: Attribute| row.get(attribute_idx[attr.index()]))
            .map_err(|e| PipelineError::InvalidDataset(format!("row {}: {}", line, e)))?;

        let churn = match row.get(label_idx) {
            Some("1") => 1,
            Some("0") => 0,
            other => {
                return Err(PipelineError::InvalidDataset(format!(
                    "row {}: {} must be 0 or 1, got {:?}",
                    line, config.label_column, other
                )))
            }
        };

        rows.push(LabeledRecord { record, churn });
    }

    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_lowercase()).as_deref() {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges,Churn";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_csv_rows() {
        let contents = format!(
            "{}\n\
             7590-VHVEG,Female,No,Yes,No,1,No,No phone service,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,29.85,29.85,0\n\
             3668-QPYBK,Male,No,No,No,2,Yes,No,DSL,Yes,Yes,No,No,No,No,Month-to-month,Yes,Mailed check,53.85,108.15,1\n",
            HEADER
        );
        let file = write_temp(".csv", &contents);
        let rows = read_dataset(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].churn, 0);
        assert_eq!(rows[0].record.multiple_lines, "No phone service");
        assert_eq!(rows[1].churn, 1);
        assert_eq!(rows[1].record.tenure, 2);
        assert_eq!(rows[1].record.total_charges, 108.15);
        assert_eq!(rows[1].record.payment_method, "Mailed check");
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let contents = format!(
            "{}\n7590-VHVEG\tFemale\tNo\tYes\tNo\t1\tNo\tNo phone service\tDSL\tNo\tYes\tNo\tNo\tNo\tNo\tMonth-to-month\tYes\tElectronic check\t29.85\t29.85\t1\n",
            HEADER.replace(',', "\t")
        );
        let file = write_temp(".tsv", &contents);
        let rows = read_dataset(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.payment_method, "Electronic check");
    }

    #[test]
    fn missing_attribute_column_is_reported() {
        let header = HEADER.replace(",Contract", "");
        let file = write_temp(".csv", &format!("{}\n", header));
        let err = read_dataset(file.path()).unwrap_err();
        assert!(err.to_string().contains("Contract"), "{}", err);
    }

    #[test]
    fn invalid_label_is_reported_with_row() {
        let contents = format!(
            "{}\n7590-VHVEG,Female,No,Yes,No,1,No,No phone service,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,29.85,29.85,Yes\n",
            HEADER
        );
        let file = write_temp(".csv", &contents);
        let err = read_dataset(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDataset(_)));
        assert!(err.to_string().contains("row 1"), "{}", err);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_dataset("/nonexistent/churn.csv").is_err());
    }
}
