pub mod input;
pub mod output;

use anyhow::{Context, Result};
use churn_model::bundle;
use churn_model::inference::{predict_batch, PredictionResult};
use churn_model::schema::CustomerRecord;
use std::fs;

use crate::inference::input::PredictCommandConfig;
use crate::inference::output::write_predictions;

/// Parse a JSON document holding one record or an array of records.
pub fn parse_records(json: &str) -> Result<Vec<CustomerRecord>> {
    let value: serde_json::Value = serde_json::from_str(json).context("Input is not valid JSON")?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        single => vec![single],
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            CustomerRecord::from_json(&item.to_string()).with_context(|| format!("Invalid customer record {}", i))
        })
        .collect()
}

pub fn run_inference(config: &PredictCommandConfig) -> Result<()> {
    let bundle = bundle::load(&config.model_path)
        .with_context(|| format!("Failed to load model bundle: {}", config.model_path))?;

    let json = fs::read_to_string(&config.input_file)
        .with_context(|| format!("Failed to read input file: {}", config.input_file))?;
    let records = parse_records(&json)?;
    log::info!("Loaded {} customer records", records.len());

    if config.validate_records {
        for (i, record) in records.iter().enumerate() {
            record
                .validate()
                .with_context(|| format!("Customer record {} failed validation", i))?;
        }
    }

    let start_time = std::time::Instant::now();
    let results: Vec<PredictionResult> = predict_batch(&records, &bundle)
        .into_iter()
        .enumerate()
        .map(|(i, result)| result.with_context(|| format!("Prediction failed for record {}", i)))
        .collect::<Result<_>>()?;
    log::info!("Inference completed in {:?}", start_time.elapsed());

    write_predictions(&results, config.output_file.as_deref())?;
    if let Some(output_file) = &config.output_file {
        log::info!("Predictions saved to: {}", output_file);
    }

    Ok(())
}
