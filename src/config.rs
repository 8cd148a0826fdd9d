// src/config.rs
//! Selector configuration (TOML).
//!
//! Resolution order:
//! 1) `$SELECTOR_CONFIG_PATH` (must exist)
//! 2) `config/selector.toml` if present
//! 3) built-in defaults
//!
//! `$SELECTOR_SEED` overrides `[selection].seed`.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_SELECTOR_CONFIG_PATH: &str = "config/selector.toml";
pub const ENV_SELECTOR_CONFIG_PATH: &str = "SELECTOR_CONFIG_PATH";
pub const ENV_SELECTOR_SEED: &str = "SELECTOR_SEED";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub selection: SelectionConfig,
    pub pareto: ParetoParams,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of unique scenarios a run aims for.
    pub target_size: usize,
    /// Fixed seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_size: 100,
            seed: None,
        }
    }
}

/// Evolutionary search parameters (μ, λ, generations, variation rates, genome length).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParetoParams {
    pub population: usize,
    pub offspring: usize,
    pub generations: usize,
    pub crossover_prob: f64,
    /// Per-gene mutation probability.
    pub mutation_prob: f64,
    pub genome_len: usize,
}

impl Default for ParetoParams {
    fn default() -> Self {
        Self {
            population: 50,
            offspring: 100,
            generations: 50,
            crossover_prob: 0.7,
            mutation_prob: 0.2,
            genome_len: 100,
        }
    }
}

impl ParetoParams {
    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            bail!("pareto.population must be > 0");
        }
        if self.offspring == 0 {
            bail!("pareto.offspring must be > 0");
        }
        if self.genome_len == 0 {
            bail!("pareto.genome_len must be > 0");
        }
        for (name, p) in [
            ("crossover_prob", self.crossover_prob),
            ("mutation_prob", self.mutation_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                bail!("pareto.{name} must be within [0, 1], got {p}");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub filtered_path: PathBuf,
    pub selected_path: PathBuf,
    pub pareto_results_path: PathBuf,
    pub greedy_results_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filtered_path: PathBuf::from("filtered_scenarios.json"),
            selected_path: PathBuf::from("selected_scenarios.json"),
            pareto_results_path: PathBuf::from("nsga2_results.json"),
            greedy_results_path: PathBuf::from("random_search_results.json"),
        }
    }
}

impl SelectorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: SelectorConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading selector config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Env path, then the default file, then built-in defaults. Applies env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_SELECTOR_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_SELECTOR_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else {
            let default = PathBuf::from(DEFAULT_SELECTOR_CONFIG_PATH);
            if default.exists() {
                Self::load_from(&default)?
            } else {
                info!("no selector config found, using built-in defaults");
                Self::default()
            }
        };

        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// `--config` path when given, otherwise [`Self::load_default`]. Env overrides apply to both.
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                let mut cfg = Self::load_from(path)?;
                cfg.apply_env_overrides()?;
                Ok(cfg)
            }
            None => Self::load_default(),
        }
    }

    /// `$SELECTOR_SEED` replaces `[selection].seed` when set.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(seed) = parse_seed_env(std::env::var(ENV_SELECTOR_SEED).ok())? {
            self.selection.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.selection.target_size == 0 {
            bail!("selection.target_size must be > 0");
        }
        self.pareto.validate()
    }
}

fn parse_seed_env(raw: Option<String>) -> Result<Option<u64>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("{ENV_SELECTOR_SEED} must be an unsigned integer, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_parameters() {
        let cfg = SelectorConfig::default();
        assert_eq!(cfg.selection.target_size, 100);
        assert_eq!(cfg.pareto.population, 50);
        assert_eq!(cfg.pareto.offspring, 100);
        assert_eq!(cfg.pareto.generations, 50);
        assert_eq!(cfg.pareto.genome_len, 100);
        assert!((cfg.pareto.crossover_prob - 0.7).abs() < f64::EPSILON);
        assert!((cfg.pareto.mutation_prob - 0.2).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = SelectorConfig::from_toml_str(
            r#"
[selection]
seed = 7

[pareto]
generations = 5
"#,
        )
        .unwrap();
        assert_eq!(cfg.selection.seed, Some(7));
        assert_eq!(cfg.selection.target_size, 100);
        assert_eq!(cfg.pareto.generations, 5);
        assert_eq!(cfg.pareto.population, 50);
        assert_eq!(
            cfg.output.pareto_results_path,
            PathBuf::from("nsga2_results.json")
        );
    }

    #[test]
    fn invalid_probabilities_are_rejected() {
        let err = SelectorConfig::from_toml_str("[pareto]\nmutation_prob = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("mutation_prob"));
        assert!(SelectorConfig::from_toml_str("[pareto]\noffspring = 0\n").is_err());
    }

    #[test]
    fn seed_env_parsing() {
        assert_eq!(parse_seed_env(None).unwrap(), None);
        assert_eq!(parse_seed_env(Some(" 42 ".into())).unwrap(), Some(42));
        assert!(parse_seed_env(Some("abc".into())).is_err());
    }
}
