use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use resample_classifiers::config::ModelType;
use resample_cli::simulate::{load_run_config, run_simulation, write_run_outputs, RunConfig};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("RESAMPLE_LOG", "error,resample=info"))
        .init();

    let matches = Command::new("resample")
        .version(clap::crate_version!())
        .about("Monte Carlo train/test resampling of a binary survival classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Run repeated random splits, fit the classifier and report metric distributions")
                .arg(
                    Arg::new("data")
                        .help("Path to the passenger table (class, age, gender, survived)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON run configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("trials")
                        .short('n')
                        .long("trials")
                        .help("Number of trials. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("test_fraction")
                        .short('f')
                        .long("test-fraction")
                        .help("Fraction of rows held out per trial, in (0, 1).")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .help("Seed for the partition RNG. Without it every run differs.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("c")
                        .long("c")
                        .help("Inverse regularization strength of the logistic regression.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("max_iter")
                        .long("max-iter")
                        .help("Iteration budget of the logistic regression solver.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory for summary.json and the HTML plots.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("no_plots")
                        .long("no-plots")
                        .help("Skip writing the HTML plots.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Skip writing the HTML report page.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("template").about("Print the default JSON run configuration"))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("simulate", sub_m)) => handle_simulate(sub_m),
        Some(("template", _)) => {
            println!("{}", serde_json::to_string_pretty(&RunConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_simulate(matches: &ArgMatches) -> Result<()> {
    let data_path = matches
        .get_one::<PathBuf>("data")
        .ok_or_else(|| anyhow::anyhow!("Missing data path"))?;
    eprintln!("[resample] Simulating on: {:?}", data_path);

    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = match config_path {
        Some(path) => {
            eprintln!("[resample] Using config: {:?}", path);
            load_run_config(path)?
        }
        None => RunConfig::default(),
    };
    apply_overrides(&mut config, matches);

    if config_path.is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[resample] No config provided; using:\n{}", default_json);
    }

    let result = match run_simulation(data_path, &config) {
        Ok(result) => result,
        Err(e) => {
            log::error!("Simulation failed: {:#}", e);
            std::process::exit(1)
        }
    };

    for line in result.report_lines() {
        println!("{}", line);
    }

    let written = write_run_outputs(&result, &config)?;
    eprintln!(
        "[resample] Completed {} trials; wrote {} files to {}",
        result.outcome.trials.len(),
        written.len(),
        config.output_dir.display()
    );
    Ok(())
}

fn apply_overrides(config: &mut RunConfig, matches: &ArgMatches) {
    if let Some(&n) = matches.get_one::<usize>("trials") {
        config.simulation.n_trials = n;
    }
    if let Some(&f) = matches.get_one::<f64>("test_fraction") {
        config.simulation.test_fraction = f;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.simulation.seed = Some(seed);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output_dir") {
        config.output_dir = dir.clone();
    }
    if matches.get_flag("no_plots") {
        config.write_plots = false;
    }
    if matches.get_flag("no_report") {
        config.write_report = false;
    }

    let ModelType::LogisticRegression { c, max_iter, .. } = &mut config.simulation.model.model_type;
    if let Some(&value) = matches.get_one::<f64>("c") {
        *c = value;
    }
    if let Some(&value) = matches.get_one::<usize>("max_iter") {
        *max_iter = value;
    }
}
