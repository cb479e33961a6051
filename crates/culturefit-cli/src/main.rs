use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use culturefit_cli::cli::build_cli;
use culturefit_cli::predict::run_predict;
use culturefit_cli::serve::{run_server, ServeConfig};
use culturefit_cli::train::input::TrainConfig;
use culturefit_cli::train::trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CULTUREFIT_LOG", "error,culturefit=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("serve", sub_m)) => handle_serve(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[culturefit::train] Training from config: {:?}", path),
        None => eprintln!("[culturefit::train] No config file provided; using defaults."),
    }

    let params = TrainConfig::from_arguments(config_path.map(PathBuf::as_path), matches)?;

    match trainer::run_training(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let config = ServeConfig {
        models_dir: matches
            .get_one::<PathBuf>("models_dir")
            .cloned()
            .unwrap_or_default(),
        host: matches.get_one::<String>("host").cloned().unwrap_or_default(),
        port: matches.get_one::<u16>("port").copied().unwrap_or_default(),
    };
    log::info!(
        "[culturefit::serve] Serving models from {:?} on {}:{}",
        config.models_dir,
        config.host,
        config.port
    );

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(run_server(config)) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Server failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let input: &PathBuf = matches
        .get_one("input")
        .ok_or_else(|| anyhow::anyhow!("input is required"))?;
    let models_dir: &PathBuf = matches
        .get_one("models_dir")
        .ok_or_else(|| anyhow::anyhow!("models_dir is required"))?;
    let output: Option<&PathBuf> = matches.get_one("output_file");

    match run_predict(input, models_dir, output.map(PathBuf::as_path)) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
