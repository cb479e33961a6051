//! culturefit-classifiers: candidate culture-fit models.
//!
//! Three random-forest pipelines share one feature schema: a regressor for
//! the culture fit score, a classifier for conflict risk (Low / Medium /
//! High) and a classifier for the recommended team. Each pipeline pairs a
//! one-hot preprocessor with its model and persists as a single JSON file.
//!
//! The crate covers dataset loading, seeded train/test splitting, forest
//! fitting, held-out evaluation, persistence and the `CulturePredictor`
//! seam used by the HTTP service.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod interpretation;
pub mod models;
pub mod pipeline;
pub mod predictor;
pub mod preprocessing;
pub mod report;
pub mod schema;
pub mod stats;
pub mod training;
