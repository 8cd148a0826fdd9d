// src/scenario.rs
//! Scenario records as produced by the simulator runs.
//!
//! JSON shape (one object per scenario, extra keys are kept verbatim):
//! {
//!   "Scenario Name": "ped_crossing_017",
//!   "Collision Type": "walker.pedestrian.0001",
//!   "Weather": "HardRainNight",
//!   "Speed at Collision": 8.4,
//!   "Time to Collision": 2.5,
//!   "Intensity": 412.0
//! }
//!
//! Classification adds `Collision Category`, `Severity`, `Exposure` and `ASIL Level`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::classify::{Asil, Exposure, Severity};

/// Weather preset the scenario was recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    ClearNoon,
    ClearNight,
    HardRainNoon,
    HardRainNight,
}

impl Weather {
    pub fn is_rain(self) -> bool {
        matches!(self, Weather::HardRainNoon | Weather::HardRainNight)
    }
}

/// Coarse actor class derived from the free-text `Collision Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCategory {
    Pedestrian,
    #[serde(rename = "NPC_VEHICLE")]
    NpcVehicle,
    Obstacle,
}

impl CollisionCategory {
    /// `walker`/`diamondback` → pedestrian (cyclists included), `vehicle` → NPC vehicle,
    /// anything else is a static obstacle.
    pub fn from_actor(raw: &str) -> Self {
        if is_pedestrian_actor(raw) {
            CollisionCategory::Pedestrian
        } else if raw.contains("vehicle") {
            CollisionCategory::NpcVehicle
        } else {
            CollisionCategory::Obstacle
        }
    }
}

pub(crate) fn is_pedestrian_actor(raw: &str) -> bool {
    raw.contains("walker") || raw.contains("diamondback")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    #[serde(rename = "Scenario Name")]
    pub name: String,
    #[serde(rename = "Collision Type")]
    pub collision_actor_raw: String,
    #[serde(rename = "Weather")]
    pub weather: Weather,
    #[serde(rename = "Speed at Collision")]
    pub speed_at_collision_mps: f64,
    #[serde(rename = "Time to Collision")]
    pub time_to_collision_s: f64,
    #[serde(rename = "Intensity")]
    pub intensity: f64,

    #[serde(
        rename = "Collision Category",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collision_category: Option<CollisionCategory>,
    #[serde(rename = "Severity", default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(rename = "Exposure", default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Exposure>,
    #[serde(rename = "ASIL Level", default, skip_serializing_if = "Option::is_none")]
    pub asil: Option<Asil>,

    /// Any other keys present in the input, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScenarioRecord {
    pub fn new(
        name: impl Into<String>,
        collision_actor_raw: impl Into<String>,
        weather: Weather,
        speed_at_collision_mps: f64,
        time_to_collision_s: f64,
        intensity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            collision_actor_raw: collision_actor_raw.into(),
            weather,
            speed_at_collision_mps,
            time_to_collision_s,
            intensity,
            collision_category: None,
            severity: None,
            exposure: None,
            asil: None,
            extra: Map::new(),
        }
    }

    /// Category as a pure function of the actor descriptor (ignores any stored value).
    pub fn category(&self) -> CollisionCategory {
        CollisionCategory::from_actor(&self.collision_actor_raw)
    }

    pub fn is_pedestrian_or_cyclist(&self) -> bool {
        is_pedestrian_actor(&self.collision_actor_raw)
    }
}

/// Parse a JSON array of scenario objects.
///
/// Each element is decoded separately so that a bad record is reported with its index.
/// Duplicate names are rejected.
pub fn parse_scenarios(json: &str) -> Result<Vec<ScenarioRecord>> {
    let raw: Vec<Value> =
        serde_json::from_str(json).context("scenario file must be a JSON array of objects")?;

    let mut out = Vec::with_capacity(raw.len());
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(raw.len());
    for (i, v) in raw.into_iter().enumerate() {
        let rec: ScenarioRecord = serde_json::from_value(v)
            .with_context(|| format!("scenario record #{i} is malformed"))?;
        if let Some(first) = seen.insert(rec.name.clone(), i) {
            return Err(anyhow!(
                "duplicate scenario name `{}` at records #{first} and #{i}",
                rec.name
            ));
        }
        out.push(rec);
    }
    Ok(out)
}

pub fn load_scenarios(path: &Path) -> Result<Vec<ScenarioRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading scenarios from {}", path.display()))?;
    parse_scenarios(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Write records as a pretty-printed JSON array (4-space indent).
pub fn save_scenarios(path: &Path, records: &[ScenarioRecord]) -> Result<()> {
    let body = to_pretty_json(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("writing scenarios to {}", path.display()))
}

pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    value.serialize(&mut ser)?;
    Ok(buf)
}
