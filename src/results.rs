//! results.rs: append-only JSON log of per-run selection metrics.
//!
//! The log is a JSON array; each run appends exactly one entry via a full
//! read-modify-write. There is no locking, so only one writer at a time.
//! A log that is not a JSON array is reported as an error and left untouched.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::fitness::{evaluate, Objectives};
use crate::scenario::{to_pretty_json, ScenarioRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    #[serde(rename = "Average Collision Probability")]
    pub probability: f64,
    #[serde(rename = "Diversity Index")]
    pub diversity: f64,
    #[serde(rename = "Average Intensity")]
    pub intensity: f64,
}

impl From<Objectives> for MetricsEntry {
    fn from(o: Objectives) -> Self {
        Self {
            probability: o.probability,
            diversity: o.diversity,
            intensity: o.intensity,
        }
    }
}

/// Summary triple of a selected subset.
pub fn summarize(selected: &[ScenarioRecord]) -> MetricsEntry {
    evaluate(selected.iter()).into()
}

/// Read an existing log. A missing file is an empty log.
pub fn read_log(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading metrics log {}", path.display()))?;
    let v: Value = serde_json::from_str(&content)
        .with_context(|| format!("metrics log {} is not valid JSON", path.display()))?;
    match v {
        Value::Array(items) => Ok(items),
        other => Err(anyhow!(
            "metrics log {} must hold a JSON array, found {}",
            path.display(),
            kind(&other)
        )),
    }
}

/// Append one entry; returns the new log length.
pub fn append_metrics(path: &Path, entry: &MetricsEntry) -> Result<usize> {
    let mut log = read_log(path)?;
    log.push(serde_json::to_value(entry)?);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let body = to_pretty_json(&log)?;
    fs::write(path, body).with_context(|| format!("writing metrics log {}", path.display()))?;

    info!(path = %path.display(), entries = log.len(), "appended selection metrics");
    Ok(log.len())
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
