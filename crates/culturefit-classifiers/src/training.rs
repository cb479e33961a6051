//! Fit and evaluate the three pipelines on one dataset.
//!
//! Each model gets its own train/test partition drawn with the same seed:
//! the regressor's is a plain shuffle, the classifiers' are stratified by
//! their own label.
use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::config::TrainingOptions;
use crate::data_handling::{stratified_train_test_split, train_test_split, Dataset, Split};
use crate::error::Result;
use crate::models::{RandomForestClassifier, RandomForestRegressor};
use crate::pipeline::{CultureFitPipeline, LabelPipeline, Pipeline};
use crate::predictor::ModelBundle;
use crate::stats::{ClassificationReport, RegressionMetrics};

/// Held-out metrics of one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub n_samples: usize,
    pub culture_fit: RegressionMetrics,
    pub conflict_risk: ClassificationReport,
    pub team_fit: ClassificationReport,
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Culture Fit Regression ===")?;
        write!(f, "{}", self.culture_fit)?;
        writeln!(f)?;
        writeln!(f, "=== Conflict Risk Classification ===")?;
        writeln!(f, "{}", self.conflict_risk)?;
        writeln!(f, "=== Team Fit Classification ===")?;
        write!(f, "{}", self.team_fit)
    }
}

pub struct TrainingOutcome {
    pub models: ModelBundle,
    pub summary: EvaluationSummary,
}

fn fit_culture_fit(dataset: &Dataset, split: &Split, options: &TrainingOptions) -> Result<(CultureFitPipeline, RegressionMetrics)> {
    let pipeline = Pipeline::fit(
        &dataset.features(&split.train),
        &dataset.culture_fit_scores(&split.train),
        RandomForestRegressor::new(options.regressor.clone()),
    )?;
    let predicted = pipeline.predict(&dataset.features(&split.test))?;
    let metrics = RegressionMetrics::compute(&dataset.culture_fit_scores(&split.test), &predicted);
    Ok((pipeline, metrics))
}

fn fit_label(
    dataset: &Dataset,
    labels: &[String],
    options: &TrainingOptions,
) -> Result<(LabelPipeline, ClassificationReport)> {
    let split = stratified_train_test_split(labels, options.test_size, options.random_state)?;
    let pick = |idx: &[usize]| idx.iter().map(|&i| labels[i].clone()).collect::<Vec<_>>();

    let pipeline = Pipeline::fit(
        &dataset.features(&split.train),
        &pick(&split.train),
        RandomForestClassifier::new(options.classifier.clone()),
    )?;
    let predicted = pipeline.predict(&dataset.features(&split.test))?;
    let report = ClassificationReport::compute(&pick(&split.test), &predicted);
    Ok((pipeline, report))
}

/// Train all three pipelines. Any failure aborts the whole run, so a caller
/// never sees a partial bundle.
pub fn train_all(dataset: &Dataset, options: &TrainingOptions) -> Result<TrainingOutcome> {
    let all: Vec<usize> = (0..dataset.len()).collect();

    let start = Instant::now();
    let split = train_test_split(dataset.len(), options.test_size, options.random_state)?;
    log::info!(
        "Culture fit regressor: {} train / {} test rows",
        split.train.len(),
        split.test.len()
    );
    let (culture_fit, culture_metrics) = fit_culture_fit(dataset, &split, options)?;
    log::info!("Culture fit regressor trained in {:?}", start.elapsed());

    let start = Instant::now();
    let (conflict_risk, conflict_report) = fit_label(dataset, &dataset.conflict_risks(&all), options)?;
    log::info!("Conflict risk classifier trained in {:?}", start.elapsed());

    let start = Instant::now();
    let (team_fit, team_report) = fit_label(dataset, &dataset.teams(&all), options)?;
    log::info!("Team fit classifier trained in {:?}", start.elapsed());

    Ok(TrainingOutcome {
        models: ModelBundle {
            culture_fit,
            conflict_risk,
            team_fit,
        },
        summary: EvaluationSummary {
            n_samples: dataset.len(),
            culture_fit: culture_metrics,
            conflict_risk: conflict_report,
            team_fit: team_report,
        },
    })
}
