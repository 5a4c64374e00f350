//! Fuzzy greedy variant.
//!
//! Free-text phrases are snapped onto the closest graph vertex (explanation
//! or finding name) by LCS similarity. A coverage-ratio greedy search then
//! adds explanations one at a time: for each threshold τ, strictest first,
//! every remaining explanation is tried and the one that most raises the
//! fraction of target vertices whose accumulated edge weight reaches τ wins.
//! The first threshold with any improvement decides the step; the search
//! ends when no threshold yields one.

use std::collections::{BTreeMap, BTreeSet};

use doknosis_common::config::FuzzyConfig;
use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};
use crate::graph::ExplanationGraph;
use crate::lcs::similarity;

/// Where one input phrase landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub phrase: String,
    pub vertex: String,
    pub similarity: f64,
    /// The vertex is an explanation rather than a finding.
    pub is_explanation: bool,
}

/// One selected explanation and its edge weight to each target vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzySelection {
    pub explanation: String,
    pub contributions: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyOutcome {
    pub matches: Vec<PhraseMatch>,
    /// Target vertices, in phrase order, without duplicates.
    pub target: Vec<String>,
    pub solution: Vec<FuzzySelection>,
    /// Ratio reached by the search, at the threshold that accepted the last step.
    pub search_ratio: f64,
    /// Ratio of the final solution at the configured report threshold.
    pub coverage_ratio: f64,
    /// Accumulated weight per target vertex over the whole solution.
    pub coverage: Vec<f64>,
    /// For phrases naming an explanation: that explanation's findings not entered.
    pub unreported: BTreeMap<String, Vec<String>>,
    /// Time spent fetching records upstream; filled in by the engine.
    #[serde(default)]
    pub query_time_ms: f64,
}

/// Snap a phrase onto the most similar vertex. Ties go to the first vertex
/// in name order. `None` only when there are no vertices.
pub fn snap_phrase(phrase: &str, graph: &ExplanationGraph, vertices: &BTreeSet<&str>) -> Option<PhraseMatch> {
    let mut best: Option<(f64, &str)> = None;
    for &vertex in vertices {
        let s = similarity(phrase, vertex);
        match best {
            Some((incumbent, _)) if s <= incumbent => {}
            _ => best = Some((s, vertex)),
        }
    }
    best.map(|(s, vertex)| PhraseMatch {
        phrase: phrase.to_string(),
        vertex: vertex.to_string(),
        similarity: s,
        is_explanation: graph.contains(vertex),
    })
}

/// Coverage of `target` by `explanations`: the per-vertex weight sums and the
/// fraction of vertices whose sum reaches `tau`.
pub fn coverage_value<S: AsRef<str>>(
    graph: &ExplanationGraph,
    explanations: &[S],
    target: &[String],
    tau: f64,
) -> (f64, Vec<f64>) {
    let coverage: Vec<f64> = target
        .iter()
        .map(|o| {
            explanations
                .iter()
                .map(|e| graph.weight_or_zero(e.as_ref(), o))
                .sum()
        })
        .collect();
    if target.is_empty() {
        return (0.0, coverage);
    }
    let covered = coverage.iter().filter(|&&v| v >= tau).count();
    (covered as f64 / target.len() as f64, coverage)
}

/// Result of the coverage-ratio search.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySearch {
    /// Forced explanations first, then the greedily added ones.
    pub explanations: Vec<String>,
    pub ratio: f64,
}

/// Coverage-ratio greedy search. `forced` explanations start in the solution
/// and are not candidates. `thresholds` must be strictest first.
pub fn fuzzy_greedy(
    graph: &ExplanationGraph,
    target: &[String],
    forced: &[String],
    thresholds: &[f64],
) -> FuzzySearch {
    let mut solution: Vec<String> = forced.to_vec();
    let mut available: BTreeSet<&str> = graph
        .explanations()
        .filter(|e| !forced.iter().any(|f| f.as_str() == *e))
        .collect();

    // Ratio of the starting solution at the strictest threshold it reaches.
    let mut current = 0.0;
    for &tau in thresholds {
        current = coverage_value(graph, &solution, target, tau).0;
        if current > 0.0 {
            break;
        }
    }

    while !available.is_empty() {
        let mut best: Option<&str> = None;
        let mut best_value = current;
        let mut accepted_at = None;

        for &tau in thresholds {
            for &candidate in &available {
                solution.push(candidate.to_string());
                let value = coverage_value(graph, &solution, target, tau).0;
                solution.pop();
                if value > best_value {
                    best_value = value;
                    best = Some(candidate);
                }
            }
            if best.is_some() {
                accepted_at = Some(tau);
                break;
            }
        }

        let Some(chosen) = best else {
            tracing::debug!(ratio = current, "Fuzzy greedy: no threshold improves coverage");
            break;
        };
        tracing::debug!(explanation = chosen, ratio = best_value, threshold = ?accepted_at, "Fuzzy greedy step accepted");
        current = best_value;
        solution.push(chosen.to_string());
        available.remove(chosen);
    }

    FuzzySearch { explanations: solution, ratio: current }
}

/// Snap phrases, search, and assemble the per-finding report.
pub fn run_fuzzy<S: AsRef<str>>(
    graph: &ExplanationGraph,
    phrases: &[S],
    config: &FuzzyConfig,
) -> Result<FuzzyOutcome> {
    let vertices = graph.vertices();

    let mut matches = Vec::new();
    let mut target: Vec<String> = Vec::new();
    let mut forced: Vec<String> = Vec::new();
    for phrase in phrases {
        let phrase = phrase.as_ref().trim();
        if phrase.is_empty() {
            continue;
        }
        let Some(m) = snap_phrase(phrase, graph, &vertices) else {
            continue;
        };
        tracing::debug!(phrase, vertex = %m.vertex, similarity = m.similarity, "Phrase snapped");
        if m.is_explanation && !forced.contains(&m.vertex) {
            forced.push(m.vertex.clone());
        }
        if !target.contains(&m.vertex) {
            target.push(m.vertex.clone());
        }
        matches.push(m);
    }
    if target.is_empty() {
        return Err(RankingError::EmptyTarget);
    }

    let unreported = forced
        .iter()
        .map(|e| {
            let missed: Vec<String> = graph
                .findings_of(e)
                .map(|edges| edges.keys().filter(|f| !target.contains(*f)).cloned().collect())
                .unwrap_or_default();
            (e.clone(), missed)
        })
        .filter(|(_, missed)| !missed.is_empty())
        .collect();

    let search = fuzzy_greedy(graph, &target, &forced, &config.coverage_thresholds);
    let (coverage_ratio, coverage) =
        coverage_value(graph, &search.explanations, &target, config.report_threshold);

    let solution = search
        .explanations
        .iter()
        .map(|e| FuzzySelection {
            explanation: e.clone(),
            contributions: coverage_value(graph, std::slice::from_ref(e), &target, config.report_threshold).1,
        })
        .collect();

    Ok(FuzzyOutcome {
        matches,
        target,
        solution,
        search_ratio: search.ratio,
        coverage_ratio,
        coverage,
        unreported,
        query_time_ms: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn graph() -> ExplanationGraph {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8), ("cough", 0.6)]).unwrap();
        b.add_explanation("Cold", [("cough", 0.4), ("sneeze", 0.7)]).unwrap();
        b.build()
    }

    #[test]
    fn test_snap_partial_phrase() {
        let g = graph();
        let v = g.vertices();
        let m = snap_phrase("feve", &g, &v).unwrap();
        assert_eq!(m.vertex, "fever");
        assert!(m.similarity > 0.0);
        assert!(!m.is_explanation);
    }

    #[test]
    fn test_snap_to_explanation_name() {
        let g = graph();
        let v = g.vertices();
        let m = snap_phrase("flu", &g, &v).unwrap();
        assert_eq!(m.vertex, "Flu");
        assert!(m.is_explanation);
    }

    #[test]
    fn test_coverage_value() {
        let g = graph();
        let target = vec!["fever".to_string(), "cough".to_string(), "sneeze".to_string()];
        let (ratio, cov) = coverage_value(&g, &["Flu", "Cold"], &target, 0.7);
        assert_eq!(cov.len(), 3);
        assert!((cov[1] - 1.0).abs() < 1e-12);
        assert!((ratio - 1.0).abs() < 1e-12);
        let (ratio, _) = coverage_value(&g, &["Flu"], &target, 0.7);
        assert!((ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_covers_all_findings() {
        let g = graph();
        let target = vec!["fever".to_string(), "sneeze".to_string()];
        let search = fuzzy_greedy(&g, &target, &[], &[0.7, 0.5, 0.3, 0.05]);
        assert_eq!(search.explanations, vec!["Cold", "Flu"]);
        assert!((search.ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_falls_back_to_looser_threshold() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Mild", [("fatigue", 0.2)]).unwrap();
        let g = b.build();
        let target = vec!["fatigue".to_string()];
        let search = fuzzy_greedy(&g, &target, &[], &[0.7, 0.5, 0.3, 0.05]);
        assert_eq!(search.explanations, vec!["Mild"]);
    }

    #[test]
    fn test_no_improvement_returns_empty() {
        let g = graph();
        let target = vec!["rash".to_string()];
        let search = fuzzy_greedy(&g, &target, &[], &[0.7, 0.5, 0.3, 0.05]);
        assert!(search.explanations.is_empty());
        assert_eq!(search.ratio, 0.0);
    }

    #[test]
    fn test_run_fuzzy_reports_contributions() {
        let g = graph();
        let outcome = run_fuzzy(&g, &["feve", "sneez", "  "], &FuzzyConfig::default()).unwrap();
        assert_eq!(outcome.target, vec!["fever", "sneeze"]);
        let chosen: Vec<_> = outcome.solution.iter().map(|s| s.explanation.as_str()).collect();
        assert_eq!(chosen, vec!["Cold", "Flu"]);
        assert_eq!(outcome.solution[0].contributions, vec![0.0, 0.7]);
        assert_eq!(outcome.solution[1].contributions, vec![0.8, 0.0]);
        assert_eq!(outcome.coverage, vec![0.8, 0.7]);
        assert!(outcome.unreported.is_empty());
    }

    #[test]
    fn test_run_fuzzy_forces_named_explanation() {
        let g = graph();
        let outcome = run_fuzzy(&g, &["flu", "fever"], &FuzzyConfig::default()).unwrap();
        assert_eq!(outcome.solution[0].explanation, "Flu");
        assert_eq!(outcome.unreported.get("Flu"), Some(&vec!["cough".to_string()]));
    }

    #[test]
    fn test_run_fuzzy_blank_phrases() {
        let g = graph();
        let phrases: [&str; 2] = ["", "   "];
        assert!(matches!(run_fuzzy(&g, &phrases, &FuzzyConfig::default()), Err(RankingError::EmptyTarget)));
    }
}
