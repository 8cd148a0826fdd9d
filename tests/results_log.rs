// tests/results_log.rs
// Metrics log append semantics and the end-to-end selection run.

use scenario_selector::pipeline::{run_selection, SelectionRequest};
use scenario_selector::results::{read_log, summarize};
use scenario_selector::{append_metrics, Asil, CategoryFilter, MetricsEntry, SelectorConfig, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

const SCENARIOS: &str = r#"[
  {"Scenario Name": "a", "Collision Type": "walker.pedestrian.0001", "Weather": "ClearNoon",
   "Speed at Collision": 3.0, "Time to Collision": 4.0, "Intensity": 120.0},
  {"Scenario Name": "b", "Collision Type": "walker.pedestrian.0002", "Weather": "HardRainNight",
   "Speed at Collision": 10.0, "Time to Collision": 1.5, "Intensity": 640.0},
  {"Scenario Name": "c", "Collision Type": "vehicle.diamondback.century", "Weather": "ClearNight",
   "Speed at Collision": 8.0, "Time to Collision": 2.0, "Intensity": 300.0},
  {"Scenario Name": "d", "Collision Type": "vehicle.tesla.model3", "Weather": "HardRainNoon",
   "Speed at Collision": 25.0, "Time to Collision": 0.5, "Intensity": 900.0}
]"#;

#[test]
fn append_grows_log_by_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("random_search_results.json");
    fs::write(
        &path,
        r#"[{"Average Collision Probability": 0.5, "Diversity Index": 1.0, "Average Intensity": 2.0}]"#,
    )
    .unwrap();

    let entry = MetricsEntry {
        probability: 0.42,
        diversity: 3.5,
        intensity: 410.0,
    };
    assert_eq!(append_metrics(&path, &entry).unwrap(), 2);

    let log = read_log(&path).unwrap();
    assert_eq!(log.len(), 2);
    let last: MetricsEntry = serde_json::from_value(log[1].clone()).unwrap();
    assert_eq!(last, entry);
    // earlier entries are untouched
    assert_eq!(log[0]["Diversity Index"], 1.0);
}

#[test]
fn full_precision_entries_read_back_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nsga2_results.json");
    let mut rng = StdRng::seed_from_u64(2718);

    let mut written = Vec::new();
    for n in 0..300 {
        let entry = MetricsEntry {
            probability: rng.random_range(-1.0..2.0),
            diversity: rng.random_range(0.0..500.0),
            intensity: rng.random_range(0.0..10_000.0),
        };
        assert_eq!(append_metrics(&path, &entry).unwrap(), n + 1);
        written.push(entry);
    }

    // every rewrite keeps earlier entries bit-exact
    let log = read_log(&path).unwrap();
    assert_eq!(log.len(), written.len());
    for (raw, expected) in log.into_iter().zip(&written) {
        let back: MetricsEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(back.probability.to_bits(), expected.probability.to_bits());
        assert_eq!(back.diversity.to_bits(), expected.diversity.to_bits());
        assert_eq!(back.intensity.to_bits(), expected.intensity.to_bits());
    }
}

#[test]
fn summary_of_empty_subset_is_zero() {
    let e = summarize(&[]);
    assert_eq!(
        e,
        MetricsEntry {
            probability: 0.0,
            diversity: 0.0,
            intensity: 0.0
        }
    );
}

#[test]
fn run_selection_writes_outputs_and_appends_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scenarios.json");
    fs::write(&input, SCENARIOS).unwrap();

    let mut cfg = SelectorConfig::default();
    cfg.selection.seed = Some(3);
    cfg.pareto.population = 6;
    cfg.pareto.offspring = 8;
    cfg.pareto.generations = 3;
    cfg.output.filtered_path = dir.path().join("filtered_scenarios.json");

    let req = SelectionRequest {
        input: input.clone(),
        category: CategoryFilter::Pedestrian,
        asil: None,
        strategy: Strategy::Pareto,
        output: Some(dir.path().join("selected_scenarios.json")),
        results: Some(dir.path().join("nsga2_results.json")),
    };

    let first = run_selection(&req, &cfg).unwrap();
    assert_eq!(first.pool_size, 4);
    // a, b and the cyclist c
    assert_eq!(first.selected.len(), 3);
    assert_eq!(first.log_entries, 1);
    assert_eq!(first.metrics, summarize(&first.selected));
    assert!(first.selected_path.exists());
    // no ASIL filter → no filtered file
    assert!(!cfg.output.filtered_path.exists());

    let second = run_selection(&req, &cfg).unwrap();
    assert_eq!(second.log_entries, 2);
    let log = read_log(&second.results_path).unwrap();
    let last: MetricsEntry = serde_json::from_value(log[1].clone()).unwrap();
    assert_eq!(last, second.metrics);
}

#[test]
fn asil_filtered_run_saves_the_filtered_pool() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scenarios.json");
    fs::write(&input, SCENARIOS).unwrap();

    let mut cfg = SelectorConfig::default();
    cfg.selection.seed = Some(9);
    cfg.output.filtered_path = dir.path().join("filtered_scenarios.json");

    let req = SelectionRequest {
        input,
        category: CategoryFilter::Pedestrian,
        asil: Some(Asil::C),
        strategy: Strategy::Greedy,
        output: Some(dir.path().join("selected_scenarios.json")),
        results: Some(dir.path().join("random_search_results.json")),
    };
    let report = run_selection(&req, &cfg).unwrap();

    // only "b" (36 km/h pedestrian in rain) rates ASIL C
    assert_eq!(report.pool_size, 1);
    assert_eq!(report.selected.len(), 1);
    assert_eq!(report.selected[0].name, "b");
    let filtered = fs::read_to_string(&cfg.output.filtered_path).unwrap();
    assert!(filtered.contains("\"ASIL Level\": \"ASIL C\""), "{filtered}");
}
