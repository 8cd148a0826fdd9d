//! Objective functions for a candidate subset.
//!
//! All three objectives are maximized and deliberately left unnormalized, so that
//! values stay comparable between the Pareto and greedy selectors:
//! - probability: mean of the per-record collision probability
//! - diversity:   σ(speed) + σ(time) + σ(intensity), population σ (ddof = 0)
//! - intensity:   mean of `Intensity`
//!
//! The probability formula is not clamped. Time-to-collision above 10 s or speed
//! above 32 m/s legitimately produce values outside [0, 1].

use serde::{Deserialize, Serialize};

use crate::scenario::{ScenarioRecord, Weather};

/// Time-to-collision horizon in seconds.
pub const TTC_HORIZON_S: f64 = 10.0;
/// Speed that maps to a speed factor of 1.0.
pub const SPEED_REFERENCE_MPS: f64 = 32.0;

pub fn weather_weight(weather: Weather) -> f64 {
    match weather {
        Weather::ClearNoon => 0.4,
        Weather::ClearNight => 0.6,
        Weather::HardRainNoon => 0.8,
        Weather::HardRainNight => 1.0,
    }
}

pub fn collision_probability(record: &ScenarioRecord) -> f64 {
    let time_factor = 1.0 - record.time_to_collision_s / TTC_HORIZON_S;
    let speed_factor = record.speed_at_collision_mps / SPEED_REFERENCE_MPS;
    time_factor * speed_factor * weather_weight(record.weather)
}

/// Individual score used by the greedy baseline to compare candidates.
pub fn scenario_score(record: &ScenarioRecord) -> f64 {
    collision_probability(record) + record.intensity
}

/// Evaluation triple attached to a subset. Not stored on records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Objectives {
    pub probability: f64,
    pub diversity: f64,
    pub intensity: f64,
}

impl Objectives {
    pub fn as_array(&self) -> [f64; 3] {
        [self.probability, self.diversity, self.intensity]
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Population standard deviation. Empty input → 0.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values.iter().copied());
    let var = mean(values.iter().map(|v| (v - m) * (v - m)));
    var.sqrt()
}

/// Works over anything that yields records, so callers can pass index-mapped views
/// without cloning.
pub fn diversity<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a ScenarioRecord>,
{
    let mut speeds = Vec::new();
    let mut times = Vec::new();
    let mut intensities = Vec::new();
    for r in records {
        speeds.push(r.speed_at_collision_mps);
        times.push(r.time_to_collision_s);
        intensities.push(r.intensity);
    }
    population_std(&speeds) + population_std(&times) + population_std(&intensities)
}

pub fn mean_probability<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a ScenarioRecord>,
{
    mean(records.into_iter().map(collision_probability))
}

pub fn mean_intensity<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a ScenarioRecord>,
{
    mean(records.into_iter().map(|r| r.intensity))
}

/// All three objectives. An empty subset evaluates to (0, 0, 0).
pub fn evaluate<'a, I>(records: I) -> Objectives
where
    I: IntoIterator<Item = &'a ScenarioRecord>,
    I::IntoIter: Clone,
{
    let it = records.into_iter();
    Objectives {
        probability: mean_probability(it.clone()),
        diversity: diversity(it.clone()),
        intensity: mean_intensity(it),
    }
}

/// Objectives of the records referenced by `indices` into `pool`.
pub fn evaluate_indices(pool: &[ScenarioRecord], indices: &[usize]) -> Objectives {
    evaluate(indices.iter().map(|&i| &pool[i]))
}
