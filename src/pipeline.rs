// src/pipeline.rs
//! End-to-end runs: load → classify → (ASIL filter) → select → save → append metrics.
//! File I/O lives here so the core modules stay pure.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::classify::Asil;
use crate::config::SelectorConfig;
use crate::repository::{CategoryFilter, ScenarioRepository};
use crate::results::{append_metrics, MetricsEntry};
use crate::scenario::{save_scenarios, ScenarioRecord};
use crate::select::{select, Strategy};

#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub input: PathBuf,
    pub category: CategoryFilter,
    pub asil: Option<Asil>,
    pub strategy: Strategy,
    /// Overrides the configured selected-scenarios path.
    pub output: Option<PathBuf>,
    /// Overrides the configured per-strategy metrics log.
    pub results: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub pool_size: usize,
    pub selected: Vec<ScenarioRecord>,
    pub metrics: MetricsEntry,
    pub log_entries: usize,
    pub selected_path: PathBuf,
    pub results_path: PathBuf,
}

pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Classify every record and, when an ASIL level is given, keep only that level.
/// The resulting pool is written to `output` when provided.
pub fn classify_and_filter(
    input: &Path,
    asil: Option<Asil>,
    output: Option<&Path>,
) -> Result<Vec<ScenarioRecord>> {
    let mut repo = ScenarioRepository::load(input)?;
    repo.classify_all();
    let pool = match asil {
        Some(level) => repo.filter_by_asil(level),
        None => repo.into_records(),
    };
    if let Some(path) = output {
        save_scenarios(path, &pool)?;
        info!(path = %path.display(), count = pool.len(), "saved classified scenarios");
    }
    Ok(pool)
}

pub fn run_selection(req: &SelectionRequest, cfg: &SelectorConfig) -> Result<RunReport> {
    let filtered_out = req.asil.map(|_| cfg.output.filtered_path.as_path());
    let pool = classify_and_filter(&req.input, req.asil, filtered_out)?;

    let mut rng = rng_from_seed(cfg.selection.seed);
    let selection = select(&pool, req.category, req.strategy, cfg, &mut rng)?;

    let selected_path = req
        .output
        .clone()
        .unwrap_or_else(|| cfg.output.selected_path.clone());
    save_scenarios(&selected_path, &selection.scenarios)?;

    let results_path = req.results.clone().unwrap_or_else(|| match req.strategy {
        Strategy::Pareto => cfg.output.pareto_results_path.clone(),
        Strategy::Greedy => cfg.output.greedy_results_path.clone(),
    });
    let metrics = MetricsEntry::from(selection.objectives);
    let log_entries = append_metrics(&results_path, &metrics)?;

    Ok(RunReport {
        pool_size: pool.len(),
        selected: selection.scenarios,
        metrics,
        log_entries,
        selected_path,
        results_path,
    })
}
