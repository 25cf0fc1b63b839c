use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::{Path, PathBuf};

use shadow_bench_analyzer::config::AnalysisConfig;
use shadow_bench_analyzer::merge::{ShapeRules, combine_phase};
use shadow_bench_analyzer::query::{Filter, matches_filters, scaling_fit};
use shadow_bench_analyzer::record::{self, MergedResults, MicroResults, RunConfig, RunRecord};
use shadow_bench_analyzer::stats::{mean_ci_from_summary, paired_difference_ci_from_summaries};

#[derive(Parser)]
#[command(
    name = "shadow-bench-analyzer",
    version,
    about = "Collect simulator benchmark results and combine repeated trials"
)]
struct Cli {
    /// Analysis configuration file (TOML). Built-in defaults apply without one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output; repeat for trace level.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every macro-benchmark run directory into `<prefix-name>.json`.
    Collect {
        #[arg(short = 'i', long, default_value = "exps")]
        base_directory: PathBuf,
        #[arg(short = 'o', long, default_value = "results")]
        prefix_name: String,
    },
    /// Parse every micro-benchmark run directory.
    CollectMicro {
        #[arg(short = 'i', long, default_value = "exps")]
        base_directory: PathBuf,
        #[arg(short = 'o', long, default_value = "results.json")]
        output: PathBuf,
    },
    /// Merge the collected trial files of one phase into `phase<N>.json`.
    Combine {
        phase: u32,
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Print each record's confidence interval for one merged metric.
    Intervals {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        metric: String,
        /// `path=value` restriction; repeatable.
        #[arg(long = "where")]
        filters: Vec<Filter>,
    },
    /// Print each micro-benchmark record's benchmark-minus-no-op interval.
    MicroDiff {
        #[arg(long)]
        input: PathBuf,
    },
    /// Fit a merged metric's mean against a numeric configuration field.
    Regress {
        #[arg(long)]
        input: PathBuf,
        /// Dotted configuration path of the scaling parameter, e.g. `exe.quantity`.
        #[arg(long)]
        x: String,
        #[arg(long)]
        metric: String,
        /// `path=value` restriction; repeatable.
        #[arg(long = "where")]
        filters: Vec<Filter>,
    },
}

fn init_logging(verbose: u8) {
    let crate_level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("shadow_bench_analyzer"), crate_level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            AnalysisConfig::load(path).with_context(|| format!("Failed to load configuration {}", path.display()))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn save<T: serde::Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    info!("Saving results to {}", path.display());
    record::write_json(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

fn describe(config: &RunConfig) -> String {
    serde_json::Value::Object(config.clone()).to_string()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Collect {
            base_directory,
            prefix_name,
        } => {
            let records = record::collect_runs(&base_directory, &config)
                .with_context(|| format!("Failed to collect runs under {}", base_directory.display()))?;
            save(Path::new(&format!("{prefix_name}.json")), &records)?;
        }
        Commands::CollectMicro { base_directory, output } => {
            let records = record::collect_micro_runs(&base_directory, &config)
                .with_context(|| format!("Failed to collect runs under {}", base_directory.display()))?;
            save(&output, &records)?;
        }
        Commands::Combine { phase, data_dir } => {
            let merged = combine_phase(&data_dir, phase, &ShapeRules::from(&config))
                .with_context(|| format!("Failed to combine phase {phase} trials in {}", data_dir.display()))?;
            save(Path::new(&format!("phase{phase}.json")), &merged)?;
        }
        Commands::Intervals { input, metric, filters } => {
            let records: Vec<RunRecord<MergedResults>> =
                record::read_records(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            for run in records.iter().filter(|r| matches_filters(&r.config, &filters)) {
                let stats = run
                    .results
                    .get(&metric)
                    .with_context(|| format!("No '{metric}' summary for {}", describe(&run.config)))?;
                let ci = mean_ci_from_summary(stats, config.confidence_level)?;
                println!(
                    "{}\n  {metric}: {:.6} ± {:.6} [{:.6}, {:.6}]",
                    describe(&run.config),
                    ci.mean,
                    ci.half_width,
                    ci.low(),
                    ci.high()
                );
            }
        }
        Commands::MicroDiff { input } => {
            let records: Vec<RunRecord<MicroResults>> =
                record::read_records(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            for run in &records {
                let ci = paired_difference_ci_from_summaries(
                    &run.results.bmark,
                    &run.results.noop,
                    config.confidence_level,
                )
                .with_context(|| format!("Failed to estimate difference for {}", describe(&run.config)))?;
                println!(
                    "{}\n  usecs: {:.3} ± {:.3}",
                    describe(&run.config),
                    ci.mean,
                    ci.half_width
                );
            }
        }
        Commands::Regress {
            input,
            x,
            metric,
            filters,
        } => {
            let records: Vec<RunRecord<MergedResults>> =
                record::read_records(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let scaling = scaling_fit(&records, &x, &metric, &filters)?;
            let fit = scaling.fit;
            println!(
                "{metric} over {x}\n\tslope: {}\n\tintercept: {}\n\tr: {}\n\tr2: {}\n\tp: {}\n\tstd_err: {}",
                fit.slope, fit.intercept, fit.r_value, fit.r_squared, fit.p_value, fit.std_err
            );
            println!("{metric} values: {}", serde_json::to_string(&scaling.points)?);
        }
    }

    Ok(())
}
