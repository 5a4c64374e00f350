//! Core entity types fed to the ranking engine.
//! The engine never persists or mutates these; collaborators build them per request.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{DoknosisError, Result};
use crate::normalise::normalise_name;

// ---------------------------------------------------------------------------
// Finding weight
// ---------------------------------------------------------------------------

/// How diagnostic one finding is for one explanation.
/// Invariant: `weight` is finite and in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingWeight {
    pub name: String,
    pub weight: f64,
}

impl FindingWeight {
    /// Build a validated edge. The name is normalised; out-of-range or
    /// non-finite weights are rejected, never clamped.
    pub fn new(name: &str, weight: f64) -> Result<Self> {
        let name = normalise_name(name);
        if name.is_empty() {
            return Err(DoknosisError::EmptyName("finding name".to_string()));
        }
        if !is_valid_weight(weight) {
            return Err(DoknosisError::MalformedEdge {
                explanation: String::new(),
                finding: name,
                weight,
            });
        }
        Ok(Self { name, weight })
    }
}

/// Parses `name:weight`. The name may itself contain colons; everything
/// before the last one is the name.
impl FromStr for FindingWeight {
    type Err = DoknosisError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, raw) = s
            .rsplit_once(':')
            .ok_or_else(|| DoknosisError::UnparsableWeight {
                finding: s.trim().to_string(),
                raw: String::new(),
            })?;
        let weight: f64 = raw.trim().parse().map_err(|_| DoknosisError::UnparsableWeight {
            finding: normalise_name(name),
            raw: raw.trim().to_string(),
        })?;
        FindingWeight::new(name, weight)
    }
}

/// True when `weight` is a finite value in the closed unit interval.
pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && (0.0..=1.0).contains(&weight)
}

// ---------------------------------------------------------------------------
// Explanation record interface
// ---------------------------------------------------------------------------

/// What the engine needs from an explanation record, whatever store it came from.
/// Collaborators adapt their own shapes to this at the boundary.
pub trait ExplanationRecord {
    fn name(&self) -> &str;

    /// Category tag, e.g. "Disease" or "Drug".
    fn category(&self) -> &str;

    /// (finding name, weight) edges. Order is irrelevant; on duplicate names the last one wins.
    fn findings(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_>;

    /// Region tags. Empty means "not region-specific".
    fn regions(&self) -> &[String] {
        &[]
    }
}

// ---------------------------------------------------------------------------
// Explanation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub findings: Vec<FindingWeight>,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl Explanation {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            category: category.into().trim().to_string(),
            findings: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Add a validated finding edge.
    pub fn with_finding(mut self, name: &str, weight: f64) -> Result<Self> {
        let edge = FindingWeight::new(name, weight).map_err(|e| self.owned_error(e))?;
        self.findings.push(edge);
        Ok(self)
    }

    /// Add several findings in `name:weight` form.
    pub fn with_findings_str<'a>(mut self, entries: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        for entry in entries {
            let edge = entry.parse::<FindingWeight>().map_err(|e| self.owned_error(e))?;
            self.findings.push(edge);
        }
        Ok(self)
    }

    fn owned_error(&self, err: DoknosisError) -> DoknosisError {
        match err {
            DoknosisError::MalformedEdge { finding, weight, .. } => DoknosisError::MalformedEdge {
                explanation: self.name.clone(),
                finding,
                weight,
            },
            other => other,
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        let region = normalise_name(region);
        if !region.is_empty() && !self.regions.contains(&region) {
            self.regions.push(region);
        }
        self
    }

    /// Weight of the edge to `finding`, if any. Last duplicate wins.
    pub fn weight_of(&self, finding: &str) -> Option<f64> {
        self.findings
            .iter()
            .rev()
            .find(|f| f.name == finding)
            .map(|f| f.weight)
    }
}

impl ExplanationRecord for Explanation {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn findings(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_> {
        Box::new(self.findings.iter().map(|f| (f.name.as_str(), f.weight)))
    }

    fn regions(&self) -> &[String] {
        &self.regions
    }
}
