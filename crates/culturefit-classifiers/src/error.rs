use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading data, fitting or persisting pipelines.
///
/// All of these are fatal to a training run or to service startup.
#[derive(Debug, Error)]
pub enum CultureFitError {
    #[error("failed to read dataset {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: invalid value {value:?} for column {column}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unknown label {label:?} in column {column}")]
    UnknownLabel { column: String, label: String },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("cannot split {n_samples} samples with test size {test_size}")]
    InvalidSplit { n_samples: usize, test_size: f64 },

    #[error("class {label:?} has {count} member(s); stratified split needs at least 2")]
    StratifyTooFewMembers { label: String, count: usize },

    #[error("feature matrix has {rows} rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("failed to access model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialise model artifact {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Request-level failures from the inference path.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The feature record failed validation and never reached a model.
    #[error("validation error: {0}")]
    Validation(String),

    /// A pipeline could not produce a usable prediction.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

pub type Result<T> = std::result::Result<T, CultureFitError>;
