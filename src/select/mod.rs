// src/select/mod.rs
//! Scenario selection entry: Pareto (NSGA-II) search or the greedy baseline,
//! followed by evaluation of the chosen subset.

pub mod greedy;
pub mod nsga;
pub mod sort;

use anyhow::Result;
use rand::Rng;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::SelectorConfig;
use crate::fitness::{evaluate, Objectives};
use crate::repository::{filter_by_category, CategoryFilter};
use crate::scenario::ScenarioRecord;
use crate::telemetry;

pub use greedy::{GreedyOutcome, GreedySelector};
pub use nsga::{
    Crossover, EvolutionOutcome, GenerationStats, Genome, IndexFlipMutation, Individual, Mutation,
    Nsga2, Nsga2Survival, Survival, TwoPointCrossover,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Pareto,
    Greedy,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Pareto => "pareto",
            Strategy::Greedy => "greedy",
        }
    }
}

/// Chosen scenarios plus their evaluation triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub scenarios: Vec<ScenarioRecord>,
    pub objectives: Objectives,
}

/// Walk fronts best-first, then individuals, then genes; keep records matching `filter`
/// and collect unique names until `target` is reached or everything is exhausted.
pub fn flatten_fronts(
    pool: &[ScenarioRecord],
    outcome: &EvolutionOutcome,
    filter: CategoryFilter,
    target: usize,
) -> Vec<ScenarioRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(target);
    for front in outcome.fronts() {
        for ind in front {
            for &gene in &ind.genome {
                if out.len() >= target {
                    return out;
                }
                let rec = &pool[gene];
                if filter.matches(rec) && seen.insert(rec.name.as_str()) {
                    out.push(rec.clone());
                }
            }
        }
    }
    out
}

/// Pareto search over the whole `records` pool; the category filter is applied while
/// flattening the final fronts.
///
/// The genome length is clamped to the pool size so a small pool degrades to
/// "as many as available".
pub fn select_pareto<R: Rng + ?Sized>(
    records: &[ScenarioRecord],
    filter: CategoryFilter,
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Result<Vec<ScenarioRecord>> {
    if records.is_empty() {
        warn!("empty scenario pool, nothing to select");
        return Ok(Vec::new());
    }
    let mut params = cfg.pareto.clone();
    if params.genome_len > records.len() {
        warn!(
            genome_len = params.genome_len,
            pool = records.len(),
            "genome length clamped to pool size"
        );
        params.genome_len = records.len();
    }
    let engine = Nsga2::new(records, params)?;
    let outcome = engine.run(rng);
    if let Some(last) = outcome.history.last() {
        info!(
            generations = last.generation,
            best_probability = last.best.probability,
            best_diversity = last.best.diversity,
            best_intensity = last.best.intensity,
            "evolution finished"
        );
    }
    Ok(flatten_fronts(
        records,
        &outcome,
        filter,
        cfg.selection.target_size,
    ))
}

/// Greedy baseline over the category-filtered pool.
pub fn select_greedy<R: Rng + ?Sized>(
    records: &[ScenarioRecord],
    filter: CategoryFilter,
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Vec<ScenarioRecord> {
    let pool = filter_by_category(records, filter);
    let out = GreedySelector::new(cfg.selection.target_size).select(&pool, rng);
    out.selected.into_iter().map(|i| pool[i].clone()).collect()
}

/// Run one strategy and evaluate the result.
pub fn select<R: Rng + ?Sized>(
    records: &[ScenarioRecord],
    filter: CategoryFilter,
    strategy: Strategy,
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Result<Selection> {
    let started = Instant::now();
    let scenarios = match strategy {
        Strategy::Pareto => select_pareto(records, filter, cfg, rng)?,
        Strategy::Greedy => select_greedy(records, filter, cfg, rng),
    };
    let objectives = evaluate(scenarios.iter());
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    telemetry::record_selection(strategy.as_str(), scenarios.len(), ms);

    if scenarios.len() < cfg.selection.target_size {
        warn!(
            strategy = strategy.as_str(),
            selected = scenarios.len(),
            target = cfg.selection.target_size,
            "selected fewer scenarios than the target"
        );
    }
    info!(
        strategy = strategy.as_str(),
        selected = scenarios.len(),
        probability = objectives.probability,
        diversity = objectives.diversity,
        intensity = objectives.intensity,
        elapsed_ms = ms,
        "selection complete"
    );
    Ok(Selection {
        scenarios,
        objectives,
    })
}
