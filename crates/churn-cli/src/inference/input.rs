use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::util::validate_json_file;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PredictCommandConfig {
    pub version: String,
    pub model_path: String,
    /// JSON file holding one customer record or an array of records.
    pub input_file: String,
    /// Prediction destination (*.csv or *.tsv); stdout when unset.
    pub output_file: Option<String>,
    /// Check records against the documented attribute domains before predicting.
    pub validate_records: bool,
}

impl Default for PredictCommandConfig {
    fn default() -> Self {
        PredictCommandConfig {
            version: clap::crate_version!().to_string(),
            model_path: String::from("churn_model.json"),
            input_file: String::new(),
            output_file: None,
            validate_records: true,
        }
    }
}

impl PredictCommandConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = PredictCommandConfig::default();

        if let Some(config_path) = config_path {
            let config_json = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let partial: serde_json::Value = serde_json::from_str(&config_json)
                .with_context(|| format!("Config file is not valid JSON: {:?}", config_path))?;

            macro_rules! load_or_default {
                ($field:ident) => {
                    if let Some(val) = partial.get(stringify!($field)) {
                        if let Ok(parsed) = serde_json::from_value(val.clone()) {
                            config.$field = parsed;
                        } else {
                            log::warn!(
                                "Config Invalid value for '{}', using default: {:?}",
                                stringify!($field), config.$field
                            );
                        }
                    } else {
                        log::warn!(
                            "Config Missing field '{}', using default: {:?}",
                            stringify!($field), config.$field
                        );
                    }
                };
            }

            load_or_default!(model_path);
            load_or_default!(input_file);
            load_or_default!(output_file);
            load_or_default!(validate_records);
        }

        // Apply CLI overrides
        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }
        if let Some(input_file) = matches.get_one::<String>("input_file") {
            config.input_file = input_file.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = Some(output_file.clone());
        }
        if matches.get_flag("skip_validation") {
            config.validate_records = false;
        }

        validate_json_file(&config.input_file)?;
        Ok(config)
    }
}
