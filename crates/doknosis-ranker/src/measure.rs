//! Coverage + strength measure over a set of explanations.
//!
//! score(S) = a * |covered targets| + b * strength(S), with a = b = 1.
//!
//! strength(S) is the product, over members of S, of each member's best edge
//! weight among the target findings. A member with no edge to any target
//! contributes 0 and collapses the whole product.

use std::collections::BTreeSet;

use crate::graph::ExplanationGraph;

/// Weight of the coverage term. Fixed.
pub const COVERAGE_WEIGHT: f64 = 1.0;
/// Weight of the strength term. Fixed.
pub const STRENGTH_WEIGHT: f64 = 1.0;

/// Scoring function for one request: a graph and the target findings it must explain.
/// Stateless, so it can be evaluated any number of times.
#[derive(Debug, Clone, Copy)]
pub struct Measure<'a> {
    graph: &'a ExplanationGraph,
    target: &'a BTreeSet<String>,
}

impl<'a> Measure<'a> {
    pub fn new(graph: &'a ExplanationGraph, target: &'a BTreeSet<String>) -> Self {
        Self { graph, target }
    }

    pub fn graph(&self) -> &'a ExplanationGraph {
        self.graph
    }

    pub fn target(&self) -> &'a BTreeSet<String> {
        self.target
    }

    /// Total score. The empty set scores 0.
    pub fn score<S: AsRef<str>>(&self, explanations: &[S]) -> f64 {
        if explanations.is_empty() {
            return 0.0;
        }
        COVERAGE_WEIGHT * self.coverage(explanations) as f64
            + STRENGTH_WEIGHT * self.strength(explanations)
    }

    /// Number of target findings with an edge from at least one member.
    pub fn coverage<S: AsRef<str>>(&self, explanations: &[S]) -> usize {
        self.target
            .iter()
            .filter(|finding| {
                explanations
                    .iter()
                    .any(|e| self.graph.weight(e.as_ref(), finding).is_some())
            })
            .count()
    }

    /// Product of each member's best target edge weight. Defined as 0 for
    /// the empty set, so an empty solution never outscores a real one.
    pub fn strength<S: AsRef<str>>(&self, explanations: &[S]) -> f64 {
        if explanations.is_empty() {
            return 0.0;
        }
        explanations
            .iter()
            .map(|e| self.best_weight(e.as_ref()))
            .product()
    }

    /// Highest edge weight from `explanation` to any target finding, 0 if none.
    pub fn best_weight(&self, explanation: &str) -> f64 {
        self.target
            .iter()
            .map(|finding| self.graph.weight_or_zero(explanation, finding))
            .fold(0.0, f64::max)
    }

    /// Target findings that `explanation` has an edge to.
    pub fn covered_by(&self, explanation: &str) -> BTreeSet<&'a str> {
        match self.graph.findings_of(explanation) {
            Some(edges) => self
                .target
                .iter()
                .filter(|f| edges.contains_key(f.as_str()))
                .map(String::as_str)
                .collect(),
            None => BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn graph() -> ExplanationGraph {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8), ("cough", 0.6)]).unwrap();
        b.add_explanation("Cold", [("cough", 0.4), ("sneeze", 0.7)]).unwrap();
        b.add_explanation("Rash", [("itch", 0.9)]).unwrap();
        b.build()
    }

    fn target(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_explanation_score() {
        let g = graph();
        let t = target(&["fever", "cough"]);
        let m = Measure::new(&g, &t);
        assert_eq!(m.coverage(&["Flu"]), 2);
        assert!((m.strength(&["Flu"]) - 0.8).abs() < 1e-12);
        assert!((m.score(&["Flu"]) - 2.8).abs() < 1e-12);
        assert!((m.score(&["Cold"]) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_pair_strength_is_product() {
        let g = graph();
        let t = target(&["fever", "cough", "sneeze"]);
        let m = Measure::new(&g, &t);
        assert_eq!(m.coverage(&["Flu", "Cold"]), 3);
        assert!((m.score(&["Flu", "Cold"]) - 3.56).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_member_collapses_strength() {
        let g = graph();
        let t = target(&["fever", "cough"]);
        let m = Measure::new(&g, &t);
        assert_eq!(m.strength(&["Flu", "Rash"]), 0.0);
        assert!((m.score(&["Flu", "Rash"]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let g = graph();
        let t = target(&["fever"]);
        let m = Measure::new(&g, &t);
        let empty: [&str; 0] = [];
        assert_eq!(m.score(&empty), 0.0);
        assert!(m.score(&empty) <= m.score(&["Flu"]));
    }

    #[test]
    fn test_unknown_explanation_contributes_nothing() {
        let g = graph();
        let t = target(&["fever"]);
        let m = Measure::new(&g, &t);
        assert_eq!(m.best_weight("Plague"), 0.0);
        assert_eq!(m.coverage(&["Plague"]), 0);
        assert!(m.covered_by("Plague").is_empty());
        assert_eq!(m.covered_by("Flu").into_iter().collect::<Vec<_>>(), vec!["fever"]);
    }
}
