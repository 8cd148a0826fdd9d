// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod classify;
pub mod config;
pub mod fitness;
pub mod pipeline;
pub mod repository;
pub mod results;
pub mod scenario;
pub mod select;

mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::classify::{classify, classify_all, Asil, Exposure, Severity};
pub use crate::config::SelectorConfig;
pub use crate::fitness::Objectives;
pub use crate::repository::{filter_by_asil, CategoryFilter, ScenarioRepository};
pub use crate::results::{append_metrics, MetricsEntry};
pub use crate::scenario::{CollisionCategory, ScenarioRecord, Weather};
pub use crate::select::{select, Selection, Strategy};
