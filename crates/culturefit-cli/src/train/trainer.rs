use anyhow::{Context, Result};
use maud::{html, Markup};
use std::path::Path;
use std::time::Instant;

use culturefit_classifiers::data_handling::Dataset;
use culturefit_classifiers::report::{Report, ReportSection};
use culturefit_classifiers::stats::ClassificationReport;
use culturefit_classifiers::training::{train_all, EvaluationSummary};

use crate::train::input::TrainConfig;
use crate::util::write_bytes_to_file;

pub const CONFIG_SNAPSHOT_FILE: &str = "training_config.json";

pub fn run_training(config: &TrainConfig) -> Result<()> {
    let start_time = Instant::now();

    log::info!("Loading training data from {}", config.data);
    let dataset = Dataset::from_csv(&config.data)
        .with_context(|| format!("Failed to load training data: {}", config.data))?;
    dataset.log_input_data_summary();

    let outcome = train_all(&dataset, &config.training)
        .with_context(|| "Training failed: an error occurred while fitting the models")?;
    log::info!("Training completed in {:?}", start_time.elapsed());

    println!("{}", outcome.summary);

    outcome
        .models
        .save(&config.models_dir)
        .with_context(|| format!("Failed to save models to {}", config.models_dir))?;

    let snapshot = Path::new(&config.models_dir).join(CONFIG_SNAPSHOT_FILE);
    let bytes = serde_json::to_vec_pretty(config)?;
    write_bytes_to_file(&snapshot, &bytes)
        .with_context(|| format!("Failed to write {:?}", snapshot))?;

    if let Some(report_path) = &config.report {
        build_report(config, &outcome.summary)?
            .save_to_file(report_path)
            .with_context(|| format!("Failed to write report: {}", report_path))?;
        log::info!("Training report written to {}", report_path);
    }

    println!("Training complete. Models saved to '{}'", config.models_dir);
    Ok(())
}

fn classification_table(report: &ClassificationReport) -> Markup {
    html! {
        table {
            tr { th { "" } th { "precision" } th { "recall" } th { "f1-score" } th { "support" } }
            @for row in report.classes.iter().chain([&report.macro_avg, &report.weighted_avg]) {
                tr {
                    td { (row.label) }
                    td { (format!("{:.2}", row.precision)) }
                    td { (format!("{:.2}", row.recall)) }
                    td { (format!("{:.2}", row.f1)) }
                    td { (row.support) }
                }
            }
        }
        p { "Accuracy: " (format!("{:.3}", report.accuracy)) }
    }
}

pub fn build_report(config: &TrainConfig, summary: &EvaluationSummary) -> Result<Report> {
    let mut report = Report::new("culturefit", &config.version, "culturefit Training Report");

    /* Section 1: Overview */
    {
        let mut overview = ReportSection::new("Overview");
        overview.add_content(html! {
            p {
                "Three random forests were trained on " (summary.n_samples) " rows from "
                code { (config.data) } ". Each model was evaluated on its own held-out "
                (format!("{:.0}%", config.training.test_size * 100.0)) " of the data."
            }
        });
        report.add_section(overview);
    }

    /* Section 2: Culture fit regression */
    {
        let mut section = ReportSection::new("Culture Fit Regression");
        section.add_content(html! {
            table {
                tr { th { "MSE" } td { (format!("{:.2}", summary.culture_fit.mse)) } }
                tr { th { "R²" } td { (format!("{:.3}", summary.culture_fit.r2)) } }
            }
        });
        report.add_section(section);
    }

    /* Section 3 & 4: classifiers */
    {
        let mut section = ReportSection::new("Conflict Risk Classification");
        section.add_content(classification_table(&summary.conflict_risk));
        report.add_section(section);

        let mut section = ReportSection::new("Team Fit Classification");
        section.add_content(classification_table(&summary.team_fit));
        report.add_section(section);
    }

    /* Section 5: Configuration */
    {
        let mut section = ReportSection::new("Configuration");
        let json = serde_json::to_string_pretty(config)?;
        section.add_content(html! {
            pre { code { (json) } }
        });
        report.add_section(section);
    }

    Ok(report)
}
