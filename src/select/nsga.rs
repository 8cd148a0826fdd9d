//! Evolutionary multi-objective search over fixed-length scenario subsets.
//!
//! A genome is `genome_len` distinct indices into the scenario pool. Every generation
//! produces `offspring` children (crossover, then per-gene mutation), merges them with
//! the current population and keeps `population` survivors through the configured
//! [`Survival`] strategy (NSGA-II by default).
//!
//! Operators are pluggable; all of them must return genomes without duplicate or
//! out-of-range indices.

use anyhow::{bail, Result};
use rand::seq::index::sample;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::config::ParetoParams;
use crate::fitness::{evaluate_indices, Objectives};
use crate::scenario::ScenarioRecord;
use crate::select::sort::{non_dominated_fronts, select_nsga2};
use crate::telemetry;

pub type Genome = Vec<usize>;

#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genome: Genome,
    pub objectives: Objectives,
}

/// Recombines two parents into one child.
pub trait Crossover {
    fn crossover<R: Rng + ?Sized>(&self, a: &[usize], b: &[usize], rng: &mut R) -> Genome;
}

/// Mutates a genome in place. `pool_size` bounds valid indices.
pub trait Mutation {
    fn mutate<R: Rng + ?Sized>(&self, genome: &mut Genome, pool_size: usize, rate: f64, rng: &mut R);
}

/// Environmental selection: picks `k` survivor indices out of `points`.
pub trait Survival {
    fn survivors(&self, points: &[[f64; 3]], k: usize) -> Vec<usize>;
}

/// Two-point crossover with duplicate repair.
///
/// The child is `a` with the segment `[lo, hi)` taken from `b`. Genes outside the
/// segment that collide with the imported segment are replaced, in order, by the
/// genes of `a`'s own segment that the child lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoPointCrossover;

impl Crossover for TwoPointCrossover {
    fn crossover<R: Rng + ?Sized>(&self, a: &[usize], b: &[usize], rng: &mut R) -> Genome {
        let len = a.len().min(b.len());
        if len < 2 {
            return a.to_vec();
        }
        let mut p1 = rng.random_range(1..=len);
        let mut p2 = rng.random_range(1..=len - 1);
        if p2 >= p1 {
            p2 += 1;
        } else {
            std::mem::swap(&mut p1, &mut p2);
        }
        let (lo, hi) = (p1, p2);
        two_point_with_repair(a, b, lo, hi)
    }
}

pub(crate) fn two_point_with_repair(a: &[usize], b: &[usize], lo: usize, hi: usize) -> Genome {
    let imported: HashSet<usize> = b[lo..hi].iter().copied().collect();
    let mut spare = a[lo..hi].iter().copied().filter(|g| !imported.contains(g));

    let mut child = Vec::with_capacity(a.len());
    for (i, &g) in a.iter().enumerate() {
        if (lo..hi).contains(&i) {
            child.push(b[i]);
        } else if imported.contains(&g) {
            // a's own segment always holds enough unused genes.
            child.push(spare.next().unwrap_or(g));
        } else {
            child.push(g);
        }
    }
    child
}

/// Per-gene index flip: a mutated gene moves to a random pool index not used by the
/// genome. When the genome already covers the whole pool it swaps with another gene.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexFlipMutation;

impl Mutation for IndexFlipMutation {
    fn mutate<R: Rng + ?Sized>(&self, genome: &mut Genome, pool_size: usize, rate: f64, rng: &mut R) {
        if genome.is_empty() || rate <= 0.0 {
            return;
        }
        let mut used: HashSet<usize> = genome.iter().copied().collect();
        for i in 0..genome.len() {
            if !rng.random_bool(rate) {
                continue;
            }
            if used.len() < pool_size {
                // Rejection sampling; at least one unused index exists.
                let replacement = loop {
                    let cand = rng.random_range(0..pool_size);
                    if !used.contains(&cand) {
                        break cand;
                    }
                };
                used.remove(&genome[i]);
                used.insert(replacement);
                genome[i] = replacement;
            } else if genome.len() > 1 {
                let j = rng.random_range(0..genome.len());
                genome.swap(i, j);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Nsga2Survival;

impl Survival for Nsga2Survival {
    fn survivors(&self, points: &[[f64; 3]], k: usize) -> Vec<usize> {
        select_nsga2(points, k)
    }
}

/// Best value of each objective seen in one generation's survivors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: Objectives,
}

#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    pub population: Vec<Individual>,
    pub history: Vec<GenerationStats>,
}

impl EvolutionOutcome {
    /// Final population split into non-dominated fronts, best first.
    pub fn fronts(&self) -> Vec<Vec<&Individual>> {
        let points: Vec<[f64; 3]> = self
            .population
            .iter()
            .map(|ind| ind.objectives.as_array())
            .collect();
        non_dominated_fronts(&points)
            .into_iter()
            .map(|front| front.into_iter().map(|i| &self.population[i]).collect())
            .collect()
    }
}

pub struct Nsga2<'a, C = TwoPointCrossover, M = IndexFlipMutation, S = Nsga2Survival> {
    pool: &'a [ScenarioRecord],
    params: ParetoParams,
    crossover: C,
    mutation: M,
    survival: S,
}

impl<'a> Nsga2<'a> {
    pub fn new(pool: &'a [ScenarioRecord], params: ParetoParams) -> Result<Self> {
        Self::with_operators(
            pool,
            params,
            TwoPointCrossover,
            IndexFlipMutation,
            Nsga2Survival,
        )
    }
}

impl<'a, C: Crossover, M: Mutation, S: Survival> Nsga2<'a, C, M, S> {
    pub fn with_operators(
        pool: &'a [ScenarioRecord],
        params: ParetoParams,
        crossover: C,
        mutation: M,
        survival: S,
    ) -> Result<Self> {
        params.validate()?;
        if params.genome_len > pool.len() {
            bail!(
                "genome length {} exceeds scenario pool size {}",
                params.genome_len,
                pool.len()
            );
        }
        Ok(Self {
            pool,
            params,
            crossover,
            mutation,
            survival,
        })
    }

    fn individual(&self, genome: Genome) -> Individual {
        let objectives = evaluate_indices(self.pool, &genome);
        Individual { genome, objectives }
    }

    /// μ genomes, each sampled without replacement from the pool.
    pub fn initial_population<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Individual> {
        (0..self.params.population)
            .map(|_| {
                let genome = sample(&mut *rng, self.pool.len(), self.params.genome_len).into_vec();
                self.individual(genome)
            })
            .collect()
    }

    /// λ children. Parents are drawn uniformly; crossover with `crossover_prob`,
    /// otherwise a clone of the first parent; then per-gene mutation.
    pub fn offspring<R: Rng + ?Sized>(&self, parents: &[Individual], rng: &mut R) -> Vec<Individual> {
        let mut children = Vec::with_capacity(self.params.offspring);
        for _ in 0..self.params.offspring {
            let a = &parents[rng.random_range(0..parents.len())];
            let b = &parents[rng.random_range(0..parents.len())];
            let mut genome = if rng.random_bool(self.params.crossover_prob) {
                self.crossover.crossover(&a.genome, &b.genome, rng)
            } else {
                a.genome.clone()
            };
            self.mutation
                .mutate(&mut genome, self.pool.len(), self.params.mutation_prob, rng);
            children.push(self.individual(genome));
        }
        children
    }

    /// (μ + λ) step: parents and children compete for μ slots.
    pub fn step<R: Rng + ?Sized>(&self, population: Vec<Individual>, rng: &mut R) -> Vec<Individual> {
        let children = self.offspring(&population, rng);
        let mut merged = population;
        merged.extend(children);
        let points: Vec<[f64; 3]> = merged.iter().map(|i| i.objectives.as_array()).collect();
        let keep = self.survival.survivors(&points, self.params.population);

        let mut slots: Vec<Option<Individual>> = merged.into_iter().map(Some).collect();
        keep.into_iter().filter_map(|i| slots[i].take()).collect()
    }

    /// Runs the fixed number of generations. No early stopping.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> EvolutionOutcome {
        let mut population = self.initial_population(rng);
        let mut history = Vec::with_capacity(self.params.generations);
        for generation in 1..=self.params.generations {
            population = self.step(population, rng);
            let best = best_of(&population);
            debug!(
                generation,
                probability = best.probability,
                diversity = best.diversity,
                intensity = best.intensity,
                "nsga generation"
            );
            telemetry::record_generation();
            history.push(GenerationStats { generation, best });
        }
        EvolutionOutcome {
            population,
            history,
        }
    }
}

fn best_of(population: &[Individual]) -> Objectives {
    let mut best = Objectives {
        probability: f64::NEG_INFINITY,
        diversity: f64::NEG_INFINITY,
        intensity: f64::NEG_INFINITY,
    };
    for ind in population {
        best.probability = best.probability.max(ind.objectives.probability);
        best.diversity = best.diversity.max(ind.objectives.diversity);
        best.intensity = best.intensity.max(ind.objectives.intensity);
    }
    best
}
