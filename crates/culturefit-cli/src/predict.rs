use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use culturefit_classifiers::data_handling::{delimiter_for, read_feature_records};
use culturefit_classifiers::interpretation::Interpretation;
use culturefit_classifiers::predictor::{CulturePredictor, ModelBundle, PredictionResult};
use culturefit_classifiers::schema::{FeatureRecord, FEATURE_COLUMNS};

use crate::util::extension_of;

pub const PREDICTION_COLUMNS: [&str; 3] = ["culture_fit_score", "conflict_risk", "recommended_team"];

#[derive(Serialize)]
struct SinglePrediction<'a> {
    prediction: &'a PredictionResult,
    interpretation: &'a Interpretation,
}

pub fn run_predict(input: &Path, models_dir: &Path, output: Option<&Path>) -> Result<()> {
    let models = ModelBundle::load(models_dir)
        .with_context(|| format!("Failed to load models from {:?}", models_dir))?;

    match extension_of(input).as_deref() {
        Some("json") => predict_record(&models, input),
        Some("csv") | Some("tsv") => predict_table(&models, input, output),
        _ => anyhow::bail!("Input must be a .json record or a .csv/.tsv table: {:?}", input),
    }
}

fn predict_record(models: &dyn CulturePredictor, input: &Path) -> Result<()> {
    let body = fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
    let record: FeatureRecord =
        serde_json::from_str(&body).with_context(|| format!("Invalid feature record in {:?}", input))?;

    let prediction = models.predict_all(&record)?;
    let interpretation = Interpretation::of(&prediction);
    println!(
        "{}",
        serde_json::to_string_pretty(&SinglePrediction {
            prediction: &prediction,
            interpretation: &interpretation,
        })?
    );
    eprint!("{}", interpretation);
    Ok(())
}

fn predict_table(models: &dyn CulturePredictor, input: &Path, output: Option<&Path>) -> Result<()> {
    let records = read_feature_records(input).with_context(|| format!("Failed to read {:?}", input))?;
    log::info!("Predicting {} rows from {:?}", records.len(), input);

    let results = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            models
                .predict_all(record)
                .with_context(|| format!("Row {} could not be predicted", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    match output {
        Some(path) => {
            let delimiter = delimiter_for(path);
            let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_predictions(&records, &results, BufWriter::new(file), delimiter)?;
            log::info!("Predictions written to {:?}", path);
        }
        None => write_predictions(&records, &results, io::stdout().lock(), b',')?,
    }
    Ok(())
}

/// Write each feature row followed by its three predictions.
pub fn write_predictions<W: Write>(
    records: &[FeatureRecord],
    results: &[PredictionResult],
    out: W,
    delimiter: u8,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);

    writer.write_record(FEATURE_COLUMNS.iter().chain(PREDICTION_COLUMNS.iter()))?;
    for (record, result) in records.iter().zip(results) {
        let mut row = record.to_row();
        row.push(format!("{:.4}", result.culture_fit_score));
        row.push(result.conflict_risk.to_string());
        row.push(result.recommended_team.clone());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
