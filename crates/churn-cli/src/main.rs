use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use churn_cli::inference::input::PredictCommandConfig;
use churn_cli::inference::run_inference;
use churn_cli::train::input::TrainCommandConfig;
use churn_cli::train::run_training;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(
            env_logger::Env::default().filter_or("CHURN_LOG", "error,churn=info,churn_model=info,churn_cli=info"),
        )
        .init();

    let matches = Command::new("churn")
        .version(clap::crate_version!())
        .about("Telecom churn prediction: train a gradient boosted model and score customers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a churn model from a processed dataset")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the processed dataset (*.csv or *.tsv). Overrides the \
                             training data file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "File path that the model bundle will be written to. \
                             Overrides the path specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("report_file")
                        .short('r')
                        .long("report_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("File path for the JSON training report. Defaults to the bundle directory.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for the stratified split and cross-validation folds."),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict churn for customer records using a trained model bundle")
                .arg(
                    Arg::new("config")
                        .help("Path to prediction configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model bundle (*.json)")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("input_file")
                        .short('d')
                        .long("input")
                        .help("Path to a JSON file holding one customer record or an array of records")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Path to the output file for predictions (*.csv or *.tsv). Defaults to stdout.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("skip_validation")
                        .long("skip-validation")
                        .help("Do not check records against the documented attribute domains.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", train_matches)) => handle_train(train_matches),
        Some(("predict", predict_matches)) => handle_predict(predict_matches),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if config_path.is_none() && matches.get_one::<String>("train_data").is_none() {
        eprintln!("[churn::train] No config file provided; default config:");
        println!("{}", serde_json::to_string_pretty(&TrainCommandConfig::default())?);
        return Ok(());
    }
    log::info!("[churn::train] Training from config: {:?}", config_path);

    let params = TrainCommandConfig::from_arguments(config_path, matches)?;

    match run_training(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if config_path.is_none() && matches.get_one::<String>("input_file").is_none() {
        eprintln!("[churn::predict] No config file provided; default config:");
        println!("{}", serde_json::to_string_pretty(&PredictCommandConfig::default())?);
        return Ok(());
    }
    log::info!("[churn::predict] Predicting with config: {:?}", config_path);

    let params = PredictCommandConfig::from_arguments(config_path, matches)?;

    match run_inference(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Inference failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
