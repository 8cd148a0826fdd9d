// tests/selection_greedy.rs
// Greedy baseline: always min(target, pool) unique scenarios from the requested category.

use rand::rngs::StdRng;
use rand::SeedableRng;
use scenario_selector::select::GreedySelector;
use scenario_selector::{select, CategoryFilter, ScenarioRecord, SelectorConfig, Strategy, Weather};
use std::collections::HashSet;

fn pool(n: usize, actor: &str, prefix: &str) -> Vec<ScenarioRecord> {
    (0..n)
        .map(|i| {
            let weather = if i % 2 == 0 {
                Weather::ClearNoon
            } else {
                Weather::HardRainNight
            };
            ScenarioRecord::new(
                format!("{prefix}_{i:03}"),
                actor,
                weather,
                (i % 20) as f64,
                (i % 6) as f64,
                (i * 13 % 400) as f64,
            )
        })
        .collect()
}

#[test]
fn fills_to_target_from_a_large_pool() {
    let mut records = pool(180, "walker.pedestrian.0003", "ped");
    records.extend(pool(60, "vehicle.audi.tt", "car"));
    let mut rng = StdRng::seed_from_u64(2024);

    let out = select(
        &records,
        CategoryFilter::Pedestrian,
        Strategy::Greedy,
        &SelectorConfig::default(),
        &mut rng,
    )
    .unwrap();

    assert_eq!(out.scenarios.len(), 100);
    assert!(out.scenarios.iter().all(|s| s.name.starts_with("ped_")));
    let unique: HashSet<_> = out.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(unique.len(), 100);
}

#[test]
fn small_pool_takes_everything() {
    let records = pool(40, "vehicle.audi.tt", "car");
    let mut rng = StdRng::seed_from_u64(5);
    let out = select(
        &records,
        CategoryFilter::Vehicle,
        Strategy::Greedy,
        &SelectorConfig::default(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(out.scenarios.len(), 40);
}

#[test]
fn other_category_only_gives_empty_result() {
    let records = pool(25, "vehicle.audi.tt", "car");
    let mut rng = StdRng::seed_from_u64(5);
    let out = select(
        &records,
        CategoryFilter::Pedestrian,
        Strategy::Greedy,
        &SelectorConfig::default(),
        &mut rng,
    )
    .unwrap();
    assert!(out.scenarios.is_empty());
}

#[test]
fn outcome_accounts_for_every_draw() {
    let records = pool(150, "walker.pedestrian.0003", "ped");
    let mut rng = StdRng::seed_from_u64(11);
    let out = GreedySelector::new(100).select(&records, &mut rng);

    assert_eq!(out.selected.len(), 100);
    assert!(out.accepted_by_rule >= 1);
    assert!(out.accepted_by_rule <= out.draws);
    assert!(out.draws <= records.len());
}
