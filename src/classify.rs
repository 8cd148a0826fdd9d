//! # Safety Classification
//! Deterministic rule tables mapping collision telemetry to an ISO 26262-style rating.
//!
//! Pipeline per record:
//! 1) speed m/s → km/h, then into a half-open speed band
//! 2) (category, band) → Severity
//! 3) (weather family, band) → Exposure
//! 4) (Severity, Exposure, Controllability) → ASIL, controllability fixed at `C3`
//!
//! Every step is total: inputs outside the tables yield the `Undefined` sentinel,
//! which propagates to an undefined ASIL. Nothing here fails.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scenario::{CollisionCategory, ScenarioRecord, Weather};
use crate::telemetry;

pub const VERY_LOW_SPEED_KPH: (f64, f64) = (0.0, 15.0);
pub const LOW_SPEED_KPH: (f64, f64) = (15.0, 50.0);
pub const MEDIUM_SPEED_KPH: (f64, f64) = (50.0, 115.0);

pub fn mps_to_kph(speed_mps: f64) -> f64 {
    speed_mps * 3.6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedBand {
    VeryLow,
    Low,
    Medium,
}

impl SpeedBand {
    /// `None` for speeds below 0 or at/above 115 km/h (and NaN).
    pub fn from_kph(kph: f64) -> Option<Self> {
        let within = |(lo, hi): (f64, f64)| lo <= kph && kph < hi;
        if within(VERY_LOW_SPEED_KPH) {
            Some(SpeedBand::VeryLow)
        } else if within(LOW_SPEED_KPH) {
            Some(SpeedBand::Low)
        } else if within(MEDIUM_SPEED_KPH) {
            Some(SpeedBand::Medium)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    S0,
    S1,
    S2,
    S3,
    #[serde(rename = "Severity Not Defined")]
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exposure {
    E1,
    E2,
    E3,
    E4,
    #[serde(rename = "Exposure Not Defined")]
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controllability {
    C0,
    C1,
    C2,
    C3,
}

/// The single controllability level applied to every scenario.
pub const FIXED_CONTROLLABILITY: Controllability = Controllability::C3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asil {
    #[serde(rename = "QM")]
    Qm,
    #[serde(rename = "ASIL A")]
    A,
    #[serde(rename = "ASIL B")]
    B,
    #[serde(rename = "ASIL C")]
    C,
    #[serde(rename = "ASIL D")]
    D,
    #[serde(rename = "ASIL Not Defined")]
    Undefined,
}

impl Asil {
    /// Canonical label as stored in `ASIL Level`.
    pub fn label(self) -> &'static str {
        match self {
            Asil::Qm => "QM",
            Asil::A => "ASIL A",
            Asil::B => "ASIL B",
            Asil::C => "ASIL C",
            Asil::D => "ASIL D",
            Asil::Undefined => "ASIL Not Defined",
        }
    }

    /// Parse a user-facing grade choice.
    ///
    /// A bare grade (`B`) gets the canonical `ASIL ` prefix, `QM` stays literal,
    /// an already-prefixed `ASIL B` is accepted too. Case-insensitive.
    pub fn from_choice(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_uppercase();
        let grade = s.strip_prefix("ASIL ").map(str::trim).unwrap_or(s.as_str());
        match grade {
            "QM" => Some(Asil::Qm),
            "A" => Some(Asil::A),
            "B" => Some(Asil::B),
            "C" => Some(Asil::C),
            "D" => Some(Asil::D),
            "NOT DEFINED" | "UNDEFINED" => Some(Asil::Undefined),
            _ => None,
        }
    }
}

impl std::fmt::Display for Asil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn severity_for(category: CollisionCategory, band: Option<SpeedBand>) -> Severity {
    use CollisionCategory::*;
    use SpeedBand::*;
    match (category, band) {
        (Obstacle, _) => Severity::S0,
        (Pedestrian, Some(VeryLow)) => Severity::S2,
        (Pedestrian, Some(Low | Medium)) => Severity::S3,
        (NpcVehicle, Some(VeryLow)) => Severity::S1,
        (NpcVehicle, Some(Low)) => Severity::S2,
        (NpcVehicle, Some(Medium)) => Severity::S3,
        (Pedestrian | NpcVehicle, None) => Severity::Undefined,
    }
}

pub fn exposure_for(weather: Weather, band: Option<SpeedBand>) -> Exposure {
    use SpeedBand::*;
    match (weather.is_rain(), band) {
        (true, Some(Medium)) => Exposure::E4,
        (true, Some(Low)) => Exposure::E3,
        (true, Some(VeryLow)) => Exposure::E2,
        (false, Some(Medium)) => Exposure::E3,
        (false, Some(Low)) => Exposure::E2,
        (false, Some(VeryLow)) => Exposure::E1,
        (_, None) => Exposure::Undefined,
    }
}

/// Exact (S, E, C3) lookup. Anything outside the S1..S3 × E1..E4 grid is undefined.
pub fn asil_for(severity: Severity, exposure: Exposure, controllability: Controllability) -> Asil {
    use Exposure::*;
    use Severity::*;
    if controllability != Controllability::C3 {
        return Asil::Undefined;
    }
    match (severity, exposure) {
        (S1, E1 | E2) => Asil::Qm,
        (S1, E3) => Asil::A,
        (S1, E4) => Asil::B,
        (S2, E1) => Asil::Qm,
        (S2, E2) => Asil::A,
        (S2, E3) => Asil::B,
        (S2, E4) => Asil::C,
        (S3, E1) => Asil::A,
        (S3, E2) => Asil::B,
        (S3, E3) => Asil::C,
        (S3, E4) => Asil::D,
        _ => Asil::Undefined,
    }
}

/// Full rating for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: CollisionCategory,
    pub severity: Severity,
    pub exposure: Exposure,
    pub asil: Asil,
}

pub fn classify(record: &ScenarioRecord) -> Classification {
    let category = record.category();
    let band = SpeedBand::from_kph(mps_to_kph(record.speed_at_collision_mps));
    let severity = severity_for(category, band);
    let exposure = exposure_for(record.weather, band);
    Classification {
        category,
        severity,
        exposure,
        asil: asil_for(severity, exposure, FIXED_CONTROLLABILITY),
    }
}

/// Attach derived fields in place; input fields are never touched.
pub fn classify_all(records: &mut [ScenarioRecord]) {
    let mut undefined = 0u64;
    for rec in records.iter_mut() {
        let c = classify(rec);
        rec.collision_category = Some(c.category);
        rec.severity = Some(c.severity);
        rec.exposure = Some(c.exposure);
        rec.asil = Some(c.asil);
        if c.asil == Asil::Undefined {
            undefined += 1;
        }
    }
    telemetry::record_classified(records.len() as u64, undefined);
    info!(
        total = records.len(),
        asil_undefined = undefined,
        "classified scenarios"
    );
}
