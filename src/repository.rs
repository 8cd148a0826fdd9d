// src/repository.rs
//! In-memory scenario snapshot with category and ASIL filters.

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use crate::classify::{classify_all, Asil};
use crate::scenario::{load_scenarios, parse_scenarios, ScenarioRecord};
use crate::telemetry;

/// Which side of the pedestrian/vehicle split a run targets.
///
/// `Vehicle` is everything that is not a pedestrian or cyclist, so static
/// obstacles land here as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Pedestrian,
    Vehicle,
}

impl CategoryFilter {
    pub fn matches(self, record: &ScenarioRecord) -> bool {
        match self {
            CategoryFilter::Pedestrian => record.is_pedestrian_or_cyclist(),
            CategoryFilter::Vehicle => !record.is_pedestrian_or_cyclist(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioRepository {
    records: Vec<ScenarioRecord>,
}

impl ScenarioRepository {
    pub fn new(records: Vec<ScenarioRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let records = load_scenarios(path)?;
        telemetry::record_loaded(records.len() as u64);
        info!(path = %path.display(), count = records.len(), "loaded scenarios");
        Ok(Self { records })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(parse_scenarios(json)?))
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ScenarioRecord> {
        self.records
    }

    /// Rate every record in place.
    pub fn classify_all(&mut self) {
        classify_all(&mut self.records);
    }

    pub fn filter_by_category(&self, filter: CategoryFilter) -> Vec<ScenarioRecord> {
        filter_by_category(&self.records, filter)
    }

    pub fn filter_by_asil(&self, level: Asil) -> Vec<ScenarioRecord> {
        filter_by_asil(&self.records, level)
    }
}

pub fn filter_by_category(records: &[ScenarioRecord], filter: CategoryFilter) -> Vec<ScenarioRecord> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Records whose derived `asil` equals `level`. Unclassified records never match.
/// An empty result is a valid outcome.
pub fn filter_by_asil(records: &[ScenarioRecord], level: Asil) -> Vec<ScenarioRecord> {
    let out: Vec<ScenarioRecord> = records
        .iter()
        .filter(|r| r.asil == Some(level))
        .cloned()
        .collect();
    if out.is_empty() {
        warn!(asil = %level, pool = records.len(), "no scenarios match ASIL level");
    } else {
        info!(asil = %level, matched = out.len(), pool = records.len(), "filtered by ASIL");
    }
    out
}
