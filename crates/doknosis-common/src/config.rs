//! Engine configuration.
//!
//! Request defaults, the greedy strategy switch, fuzzy coverage thresholds and
//! the category groups a request's type identifier expands to. Loadable from
//! YAML, JSON or TOML; every field has a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DoknosisError, Result};
use crate::normalise::normalise_name;

/// Type identifier that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-request defaults
    #[serde(default)]
    pub defaults: RequestDefaults,

    /// Greedy selector behaviour
    #[serde(default)]
    pub greedy: GreedyConfig,

    /// Fuzzy greedy variant
    #[serde(default)]
    pub fuzzy: FuzzyConfig,

    /// Bayesian ranker
    #[serde(default)]
    pub bayesian: BayesianConfig,

    /// Type identifier -> explanation category tags it selects
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            defaults: RequestDefaults::default(),
            greedy: GreedyConfig::default(),
            fuzzy: FuzzyConfig::default(),
            bayesian: BayesianConfig::default(),
            categories: default_categories(),
        }
    }
}

fn default_categories() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert("infectious disease".to_string(), vec!["Infectious disease".to_string()]);
    map.insert(
        "disease".to_string(),
        vec!["Disease".to_string(), "Infectious disease".to_string()],
    );
    map.insert("drug".to_string(), vec!["Drug".to_string()]);
    map
}

// ── Request defaults ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    /// Top-M count
    #[serde(default = "default_num_solutions")]
    pub num_solutions: usize,

    /// Largest combination size swept by the brute-force path
    #[serde(default = "default_num_combinations")]
    pub num_combinations: usize,

    /// Type identifier used when a request names none
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_num_solutions() -> usize { 10 }
fn default_num_combinations() -> usize { 1 }
fn default_category() -> String { "infectious disease".to_string() }

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            num_solutions: default_num_solutions(),
            num_combinations: default_num_combinations(),
            category: default_category(),
        }
    }
}

// ── Greedy ────────────────────────────────────────────────────────────────────

/// Which greedy lineage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreedyStrategy {
    /// Stop after the first accepted candidate: "pick the single best explanation".
    #[default]
    SingleStep,
    /// Keep extending until targets are covered, candidates run out, or the score stalls.
    Iterative,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreedyConfig {
    #[serde(default)]
    pub strategy: GreedyStrategy,
}

// ── Fuzzy ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyConfig {
    /// Coverage thresholds, strictest first
    #[serde(default = "default_coverage_thresholds")]
    pub coverage_thresholds: Vec<f64>,

    /// Threshold for the coverage ratio reported with the final solution
    #[serde(default = "default_report_threshold")]
    pub report_threshold: f64,
}

fn default_coverage_thresholds() -> Vec<f64> { vec![0.7, 0.5, 0.3, 0.05] }
fn default_report_threshold() -> f64 { 0.9 }

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            coverage_thresholds: default_coverage_thresholds(),
            report_threshold: default_report_threshold(),
        }
    }
}

// ── Bayesian ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BayesianConfig {
    /// Divide posteriors by their sum before ranking
    #[serde(default)]
    pub normalise: bool,
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load from YAML file
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path, "Loaded engine config (yaml)");
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path, "Loaded engine config (json)");
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path, "Loaded engine config (toml)");
        Ok(config)
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: &str) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.defaults.num_solutions == 0 {
            return Err(DoknosisError::Config("defaults.num_solutions must be positive".into()));
        }
        if self.defaults.num_combinations == 0 {
            return Err(DoknosisError::Config("defaults.num_combinations must be positive".into()));
        }
        let taus = &self.fuzzy.coverage_thresholds;
        if taus.is_empty() {
            return Err(DoknosisError::Config("fuzzy.coverage_thresholds must not be empty".into()));
        }
        if taus.iter().any(|t| !(t.is_finite() && *t > 0.0 && *t <= 1.0)) {
            return Err(DoknosisError::Config(format!(
                "fuzzy.coverage_thresholds must lie in (0, 1], got {taus:?}"
            )));
        }
        if taus.windows(2).any(|w| w[0] <= w[1]) {
            return Err(DoknosisError::Config(format!(
                "fuzzy.coverage_thresholds must be strictly decreasing, got {taus:?}"
            )));
        }
        if !self.fuzzy.report_threshold.is_finite() || self.fuzzy.report_threshold <= 0.0 {
            return Err(DoknosisError::Config("fuzzy.report_threshold must be positive".into()));
        }
        Ok(())
    }

    /// Category tags selected by a type identifier. `None` means every category.
    /// Identifiers without a configured group select the category of the same name.
    pub fn categories_for(&self, type_identifier: &str) -> Option<Vec<String>> {
        let key = normalise_name(type_identifier);
        if key == ALL_CATEGORIES {
            return None;
        }
        match self.categories.get(&key) {
            Some(group) => Some(group.clone()),
            None => Some(vec![type_identifier.trim().to_string()]),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
