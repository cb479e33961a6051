use clap::{Arg, Command, ValueHint};
use std::path::PathBuf;

pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "8000";

fn models_dir_arg() -> Arg {
    Arg::new("models_dir")
        .short('m')
        .long("models_dir")
        .help("Directory holding the three trained model files")
        .default_value(DEFAULT_MODELS_DIR)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

pub fn build_cli() -> Command {
    Command::new("culturefit")
        .version(clap::crate_version!())
        .about("\u{1F91D} culturefit - candidate culture fit, conflict risk and team placement")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the three models from a labelled CSV dataset")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the training dataset (*.csv or *.tsv). Overrides the \
                             dataset specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("models_dir")
                        .short('o')
                        .long("models_dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Directory the trained models are written to. Overrides the \
                             directory specified in the configuration file.",
                        )
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Write an HTML training report to this path")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test_size")
                        .long("test_size")
                        .value_parser(clap::value_parser!(f64))
                        .help("Fraction of rows held out for evaluation"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for the train/test splits and every forest"),
                )
                .arg(
                    Arg::new("n_estimators")
                        .long("n_estimators")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of trees in every forest"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the trained models over HTTP")
                .arg(models_dir_arg())
                .arg(
                    Arg::new("host")
                        .long("host")
                        .default_value(DEFAULT_HOST)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Address to bind"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .default_value(DEFAULT_PORT)
                        .value_parser(clap::value_parser!(u16))
                        .help("Port to bind"),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict a single JSON record or every row of a CSV/TSV file")
                .arg(
                    Arg::new("input")
                        .help("Feature record (*.json) or feature table (*.csv, *.tsv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(models_dir_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Where to write table predictions (*.csv or *.tsv). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
