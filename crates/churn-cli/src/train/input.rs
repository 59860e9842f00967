use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use churn_model::config::{ModelConfig, TrainConfig};

use crate::util::validate_tsv_or_csv_file;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainCommandConfig {
    pub version: String,
    pub train_data: String,
    /// Bundle destination; written atomically.
    pub output_file: String,
    /// Training report destination. Defaults to `churn_training_report.json`
    /// next to the bundle.
    pub report_file: Option<String>,
    pub label_column: String,
    pub test_size: f64,
    pub cv_folds: usize,
    pub seed: u64,
    pub model: ModelConfig,
}

impl Default for TrainCommandConfig {
    fn default() -> Self {
        let train = TrainConfig::default();
        TrainCommandConfig {
            version: clap::crate_version!().to_string(),
            train_data: String::new(),
            output_file: String::from("churn_model.json"),
            report_file: None,
            label_column: String::from("Churn"),
            test_size: train.test_size,
            cv_folds: train.cv_folds,
            seed: train.seed,
            model: train.model,
        }
    }
}

impl TrainCommandConfig {
    /// Build the config from an optional JSON file, then apply CLI overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => TrainCommandConfig::default(),
        };

        // Apply CLI overrides
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        if let Some(report_file) = matches.get_one::<String>("report_file") {
            config.report_file = Some(report_file.clone());
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.seed = *seed;
        }

        validate_tsv_or_csv_file(&config.train_data)?;
        Ok(config)
    }

    fn from_file(config_path: &Path) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let partial: serde_json::Value = serde_json::from_str(&config_json)
            .with_context(|| format!("Config file is not valid JSON: {:?}", config_path))?;
        let mut config = TrainCommandConfig::default();

        macro_rules! load_or_default {
            ($field:ident) => {
                if let Some(val) = partial.get(stringify!($field)) {
                    if let Ok(parsed) = serde_json::from_value(val.clone()) {
                        config.$field = parsed;
                    } else {
                        log::warn!(
                            "Config Invalid value for '{}', using default: {:?}",
                            stringify!($field),
                            config.$field
                        );
                    }
                } else {
                    log::warn!(
                        "Config Missing field '{}', using default: {:?}",
                        stringify!($field),
                        config.$field
                    );
                }
            };
        }

        load_or_default!(train_data);
        load_or_default!(output_file);
        load_or_default!(report_file);
        load_or_default!(label_column);
        load_or_default!(test_size);
        load_or_default!(cv_folds);
        load_or_default!(seed);
        load_or_default!(model);

        Ok(config)
    }

    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            model: self.model.clone(),
            test_size: self.test_size,
            cv_folds: self.cv_folds,
            seed: self.seed,
        }
    }

    /// Where the training report goes.
    pub fn report_path(&self) -> PathBuf {
        match &self.report_file {
            Some(path) => PathBuf::from(path),
            None => Path::new(&self.output_file)
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join("churn_training_report.json"),
        }
    }
}
