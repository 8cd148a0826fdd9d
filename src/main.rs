//! Scenario selector binary entrypoint.
//! Classifies collision scenarios by ASIL and selects a diverse, safety-critical subset.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scenario_selector::pipeline::{classify_and_filter, run_selection, SelectionRequest};
use scenario_selector::{Asil, CategoryFilter, SelectorConfig, Strategy};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CategoryArg {
    Pedestrian,
    Vehicle,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StrategyArg {
    /// NSGA-II evolutionary search.
    Pareto,
    /// Randomized greedy baseline.
    Greedy,
}

#[derive(Debug, Parser)]
#[command(
    name = "scenario-selector",
    about = "ASIL classification and multi-objective selection of collision scenarios",
    version
)]
struct Cli {
    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON log lines instead of compact text.
    #[arg(long, global = true)]
    log_json: bool,

    /// Selector config (TOML). Defaults to $SELECTOR_CONFIG_PATH or config/selector.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rate every scenario and optionally keep one ASIL level.
    Classify {
        #[arg(long)]
        input: PathBuf,
        /// QM, A, B, C or D
        #[arg(long)]
        asil: Option<String>,
        /// Where to write the classified set (default: config output.filtered_path).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Select a subset of scenarios and append its metrics to the results log.
    Select {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum)]
        category: CategoryArg,
        #[arg(long, value_enum, default_value_t = StrategyArg::Pareto)]
        strategy: StrategyArg,
        /// Restrict the pool to one ASIL level first (QM, A, B, C or D).
        #[arg(long)]
        asil: Option<String>,
        /// Deterministic seed; overrides config and $SELECTOR_SEED.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8, json: bool) {
    let default = match verbose {
        0 => "scenario_selector=info,warn",
        1 => "scenario_selector=debug,info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn parse_asil(raw: Option<&str>) -> Result<Option<Asil>> {
    raw.map(|s| {
        Asil::from_choice(s).ok_or_else(|| anyhow!("unknown ASIL level `{s}` (expected QM, A, B, C or D)"))
    })
    .transpose()
}

fn main() -> Result<()> {
    // Load .env when present (SELECTOR_CONFIG_PATH, SELECTOR_SEED, RUST_LOG).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let mut cfg = SelectorConfig::load_with(cli.config.as_deref())?;

    match cli.command {
        Command::Classify {
            input,
            asil,
            output,
        } => {
            let asil = parse_asil(asil.as_deref())?;
            let output = output.unwrap_or_else(|| cfg.output.filtered_path.clone());
            let pool = classify_and_filter(&input, asil, Some(&output))?;
            println!("Filtered scenarios saved to: {} ({} records)", output.display(), pool.len());
        }
        Command::Select {
            input,
            category,
            strategy,
            asil,
            seed,
            output,
            results,
        } => {
            if seed.is_some() {
                cfg.selection.seed = seed;
            }
            let req = SelectionRequest {
                input,
                category: match category {
                    CategoryArg::Pedestrian => CategoryFilter::Pedestrian,
                    CategoryArg::Vehicle => CategoryFilter::Vehicle,
                },
                asil: parse_asil(asil.as_deref())?,
                strategy: match strategy {
                    StrategyArg::Pareto => Strategy::Pareto,
                    StrategyArg::Greedy => Strategy::Greedy,
                },
                output,
                results,
            };
            let report = run_selection(&req, &cfg)?;

            println!("Selected scenarios saved to: {}", report.selected_path.display());
            println!(
                "Metrics saved to: {} ({} entries)",
                report.results_path.display(),
                report.log_entries
            );
            println!("Scenarios selected: {} of {}", report.selected.len(), report.pool_size);
            println!("Average Collision Probability: {}", report.metrics.probability);
            println!("Diversity Index: {}", report.metrics.diversity);
            println!("Average Intensity: {}", report.metrics.intensity);
        }
    }
    Ok(())
}
