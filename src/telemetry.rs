// src/telemetry.rs
//! Counters/histograms through the `metrics` facade.
//! No recorder is installed here; a host process can install any exporter it likes.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

/// One-time metric descriptions.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scenarios_loaded_total", "Scenario records loaded from disk.");
        describe_counter!(
            "scenarios_classified_total",
            "Scenario records rated by the safety classifier."
        );
        describe_counter!(
            "scenarios_asil_undefined_total",
            "Records whose inputs fell outside the rating tables."
        );
        describe_counter!("selection_runs_total", "Completed selector runs by strategy.");
        describe_counter!(
            "nsga_generations_total",
            "Generations evolved by the Pareto selector."
        );
        describe_counter!(
            "greedy_rejected_total",
            "Candidates rejected by the greedy acceptance rule."
        );
        describe_gauge!(
            "selection_selected_scenarios",
            "Size of the most recent selected subset."
        );
        describe_histogram!("selection_duration_ms", "Selector wall time in milliseconds.");
    });
}

pub(crate) fn record_loaded(n: u64) {
    ensure_metrics_described();
    counter!("scenarios_loaded_total").increment(n);
}

pub(crate) fn record_classified(n: u64, undefined: u64) {
    ensure_metrics_described();
    counter!("scenarios_classified_total").increment(n);
    counter!("scenarios_asil_undefined_total").increment(undefined);
}

pub(crate) fn record_generation() {
    ensure_metrics_described();
    counter!("nsga_generations_total").increment(1);
}

pub(crate) fn record_greedy_rejections(n: u64) {
    ensure_metrics_described();
    counter!("greedy_rejected_total").increment(n);
}

pub(crate) fn record_selection(strategy: &'static str, selected: usize, ms: f64) {
    ensure_metrics_described();
    counter!("selection_runs_total", "strategy" => strategy).increment(1);
    gauge!("selection_selected_scenarios").set(selected as f64);
    histogram!("selection_duration_ms").record(ms);
}
