pub mod input;

use anyhow::{Context, Result};
use churn_model::io::{read_dataset_with_config, DatasetReaderConfig};
use churn_model::trainer::train;

use crate::train::input::TrainCommandConfig;
use crate::util::write_bytes_to_file;

pub fn run_training(config: &TrainCommandConfig) -> Result<()> {
    let reader_config = DatasetReaderConfig {
        label_column: config.label_column.clone(),
        ..DatasetReaderConfig::default()
    };
    let rows = read_dataset_with_config(&config.train_data, &reader_config)
        .with_context(|| format!("Failed to read training data: {}", config.train_data))?;
    log::info!("Loaded {} customers from {}", rows.len(), config.train_data);

    let start_time = std::time::Instant::now();
    let outcome = train(&rows, &config.train_config()).context("Training failed")?;
    log::info!("Training completed in {:?}", start_time.elapsed());

    outcome
        .bundle
        .save(&config.output_file)
        .with_context(|| format!("Failed to save model bundle: {}", config.output_file))?;
    log::info!("Model bundle saved to: {}", config.output_file);

    let report_path = config.report_path();
    let bytes = serde_json::to_vec_pretty(&outcome.report)?;
    write_bytes_to_file(&report_path.to_string_lossy(), &bytes)
        .with_context(|| format!("Failed to write training report: {:?}", report_path))?;
    log::info!("Training report saved to: {:?}", report_path);

    Ok(())
}
