use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use culturefit_classifiers::config::TrainingOptions;

use crate::cli::DEFAULT_MODELS_DIR;
use crate::util::validate_tsv_or_csv_file;

pub const DEFAULT_DATA: &str = "data/employee_culture_fit_minimal_500.csv";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub version: String,
    pub data: String,
    pub models_dir: String,
    /// HTML report path; no report when unset.
    pub report: Option<String>,
    pub training: TrainingOptions,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            version: clap::crate_version!().to_string(),
            data: String::from(DEFAULT_DATA),
            models_dir: String::from(DEFAULT_MODELS_DIR),
            report: None,
            training: TrainingOptions::default(),
        }
    }
}

impl TrainConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    /// Start from the config file (or defaults) and apply CLI overrides.
    pub fn from_arguments(config_path: Option<&Path>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => TrainConfig::load(path)?,
            None => TrainConfig::default(),
        };
        config.version = clap::crate_version!().to_string();

        if let Some(data) = matches.get_one::<String>("data") {
            config.data = data.clone();
        }
        validate_tsv_or_csv_file(&config.data)?;

        if let Some(models_dir) = matches.get_one::<String>("models_dir") {
            config.models_dir = models_dir.clone();
        }

        if let Some(report) = matches.get_one::<String>("report") {
            config.report = Some(report.clone());
        }

        if let Some(&test_size) = matches.get_one::<f64>("test_size") {
            if !(test_size > 0.0 && test_size < 1.0) {
                anyhow::bail!("--test_size must be in (0, 1), got {}", test_size);
            }
            config.training.test_size = test_size;
        }

        if let Some(&seed) = matches.get_one::<u64>("seed") {
            config.training.random_state = seed;
            config.training.regressor.random_state = seed;
            config.training.classifier.random_state = seed;
        }

        if let Some(&n_estimators) = matches.get_one::<usize>("n_estimators") {
            if n_estimators == 0 {
                anyhow::bail!("--n_estimators must be at least 1");
            }
            config.training.regressor.n_estimators = n_estimators;
            config.training.classifier.n_estimators = n_estimators;
        }

        Ok(config)
    }
}
