//! Randomized greedy baseline.
//!
//! Phase 1: draw a uniformly random candidate from the remaining pool. Accept it if the
//! subset is empty, or if adding it does not lower the subset's diversity AND its
//! individual score (`probability + intensity`) beats at least one accepted scenario.
//! Every drawn candidate leaves the pool, accepted or not.
//!
//! Phase 2 (relaxation): when phase 1 ends short of the target, the unselected
//! scenarios are appended in random order until the target is met or none remain.
//!
//! Phase 1 takes at most `pool.len()` draws, so the result always has
//! `min(target, pool.len())` scenarios.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::fitness::{diversity, scenario_score};
use crate::scenario::ScenarioRecord;
use crate::telemetry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreedyOutcome {
    /// Indices into the pool, in acceptance order.
    pub selected: Vec<usize>,
    /// How many came from the acceptance rule (the rest were relaxation fill).
    pub accepted_by_rule: usize,
    /// Number of phase 1 draws.
    pub draws: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct GreedySelector {
    target: usize,
}

impl GreedySelector {
    pub fn new(target: usize) -> Self {
        Self { target }
    }

    pub fn select<R: Rng + ?Sized>(&self, pool: &[ScenarioRecord], rng: &mut R) -> GreedyOutcome {
        let mut selected: Vec<usize> = Vec::with_capacity(self.target.min(pool.len()));
        let mut remaining: Vec<usize> = (0..pool.len()).collect();
        let mut draws = 0usize;

        while selected.len() < self.target && !remaining.is_empty() {
            let pick = rng.random_range(0..remaining.len());
            let candidate = remaining.swap_remove(pick);
            draws += 1;

            if selected.is_empty() || self.accepts(pool, &selected, candidate) {
                selected.push(candidate);
            }
        }

        let accepted_by_rule = selected.len();
        telemetry::record_greedy_rejections((draws - accepted_by_rule) as u64);

        if selected.len() < self.target {
            let mut taken = vec![false; pool.len()];
            for &i in &selected {
                taken[i] = true;
            }
            let mut rest: Vec<usize> = (0..pool.len()).filter(|&i| !taken[i]).collect();
            rest.shuffle(rng);
            let room = self.target - selected.len();
            selected.extend(rest.into_iter().take(room));
        }

        debug!(
            draws,
            accepted_by_rule,
            relaxed = selected.len() - accepted_by_rule,
            "greedy selection finished"
        );

        GreedyOutcome {
            selected,
            accepted_by_rule,
            draws,
        }
    }

    fn accepts(&self, pool: &[ScenarioRecord], selected: &[usize], candidate: usize) -> bool {
        let cand = &pool[candidate];
        let cand_score = scenario_score(cand);
        let better_than_any = selected
            .iter()
            .any(|&i| scenario_score(&pool[i]) < cand_score);
        if !better_than_any {
            return false;
        }
        let current = diversity(selected.iter().map(|&i| &pool[i]));
        let with_candidate = diversity(
            selected
                .iter()
                .map(|&i| &pool[i])
                .chain(std::iter::once(cand)),
        );
        with_candidate >= current
    }
}

impl Default for GreedySelector {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Weather;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<ScenarioRecord> {
        (0..n)
            .map(|i| {
                ScenarioRecord::new(
                    format!("g{i}"),
                    "walker.pedestrian.0001",
                    Weather::HardRainNoon,
                    (i % 17) as f64,
                    (i % 9) as f64,
                    ((i * 13) % 211) as f64,
                )
            })
            .collect()
    }

    #[test]
    fn size_is_min_of_target_and_pool() {
        for (n, target) in [(0, 100), (5, 100), (100, 100), (250, 100), (40, 7)] {
            let p = pool(n);
            let out = GreedySelector::new(target).select(&p, &mut StdRng::seed_from_u64(n as u64));
            assert_eq!(out.selected.len(), target.min(n), "n={n} target={target}");
            let uniq: HashSet<_> = out.selected.iter().collect();
            assert_eq!(uniq.len(), out.selected.len());
            assert!(out.draws <= n);
        }
    }

    #[test]
    fn identical_scores_force_relaxation() {
        // Nobody can beat an equal score, so only the first draw passes the rule.
        let p: Vec<_> = (0..30)
            .map(|i| {
                ScenarioRecord::new(format!("e{i}"), "vehicle.x", Weather::ClearNoon, 5.0, 1.0, 10.0)
            })
            .collect();
        let out = GreedySelector::new(10).select(&p, &mut StdRng::seed_from_u64(1));
        assert_eq!(out.accepted_by_rule, 1);
        assert_eq!(out.draws, 30);
        assert_eq!(out.selected.len(), 10);
    }

    #[test]
    fn accepted_candidates_satisfy_the_rule() {
        let p = pool(300);
        let sel = GreedySelector::new(100);
        let out = sel.select(&p, &mut StdRng::seed_from_u64(77));
        for k in 1..out.accepted_by_rule {
            let before = &out.selected[..k];
            assert!(sel.accepts(&p, before, out.selected[k]));
        }
    }

    #[test]
    fn reproducible_with_seed() {
        let p = pool(120);
        let a = GreedySelector::default().select(&p, &mut StdRng::seed_from_u64(4));
        let b = GreedySelector::default().select(&p, &mut StdRng::seed_from_u64(4));
        assert_eq!(a, b);
    }
}
