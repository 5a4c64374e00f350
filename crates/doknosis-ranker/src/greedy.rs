//! Greedy set-cover selector.
//!
//! Each step scores `solution + [c]` for every remaining candidate and takes
//! the best. Ties go to the lexicographically smallest explanation name.
//!
//! Two lineages exist. `SingleStep` stops after the first accepted candidate,
//! which makes it a "best single explanation" pick; `Iterative` keeps going
//! until the targets are covered, the candidates run out, or no candidate
//! raises the score.

use std::collections::BTreeSet;

use doknosis_common::GreedyStrategy;
use serde::{Deserialize, Serialize};

use crate::graph::ExplanationGraph;
use crate::measure::Measure;

/// Why the selector stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every target finding is covered.
    TargetsCovered,
    /// No candidates left to try.
    CandidatesExhausted,
    /// The best candidate did not beat the current score.
    Stalled,
    /// Single-step lineage: returned after the first transition.
    SingleStep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreedySolution {
    /// Explanations in the order they were added.
    pub explanations: Vec<String>,
    /// Measure of the final solution (0 when nothing was selected).
    pub score: f64,
    /// Target findings no selected explanation covers.
    pub uncovered: BTreeSet<String>,
    pub termination: Termination,
}

impl GreedySolution {
    pub fn is_empty(&self) -> bool {
        self.explanations.is_empty()
    }
}

/// Run the greedy selector. The caller's target set is never modified.
pub fn greedy(
    graph: &ExplanationGraph,
    target: &BTreeSet<String>,
    measure: &Measure<'_>,
    strategy: GreedyStrategy,
) -> GreedySolution {
    let mut remaining: BTreeSet<String> = target.clone();
    let mut candidates: BTreeSet<&str> = graph.explanations().collect();
    let mut solution: Vec<String> = Vec::new();
    let mut best_score = f64::NEG_INFINITY;

    let termination = loop {
        if remaining.is_empty() {
            break Termination::TargetsCovered;
        }
        let Some((value, best)) = best_extension(&solution, &candidates, measure) else {
            break Termination::CandidatesExhausted;
        };

        if value <= best_score {
            break Termination::Stalled;
        }

        for finding in measure.covered_by(best) {
            remaining.remove(finding);
        }
        candidates.remove(best);
        solution.push(best.to_string());
        best_score = value;
        tracing::debug!(candidate = best, score = value, remaining = remaining.len(), "Greedy step accepted");

        if strategy == GreedyStrategy::SingleStep {
            break Termination::SingleStep;
        }
    };

    tracing::debug!(?termination, selected = solution.len(), "Greedy finished");

    GreedySolution {
        score: measure.score(&solution),
        explanations: solution,
        uncovered: remaining,
        termination,
    }
}

/// Highest-scoring one-element extension of `solution`. Candidates are visited
/// in name order and only a strictly better score replaces the incumbent.
fn best_extension<'c>(
    solution: &[String],
    candidates: &BTreeSet<&'c str>,
    measure: &Measure<'_>,
) -> Option<(f64, &'c str)> {
    let mut trial: Vec<&str> = solution.iter().map(String::as_str).collect();
    let mut best: Option<(f64, &'c str)> = None;
    for &candidate in candidates {
        trial.push(candidate);
        let value = measure.score(&trial);
        trial.pop();
        match best {
            Some((incumbent, _)) if value.total_cmp(&incumbent).is_le() => {}
            _ => best = Some((value, candidate)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn graph() -> ExplanationGraph {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8), ("cough", 0.6)]).unwrap();
        b.add_explanation("Cold", [("cough", 0.4), ("sneeze", 0.7)]).unwrap();
        b.add_explanation("Allergy", [("sneeze", 0.9), ("itchy eyes", 0.8)]).unwrap();
        b.build()
    }

    fn target(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_step_picks_best_explanation() {
        let g = graph();
        let t = target(&["fever", "cough"]);
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::SingleStep);
        assert_eq!(sol.explanations, vec!["Flu"]);
        assert!((sol.score - 2.8).abs() < 1e-12);
        assert_eq!(sol.termination, Termination::SingleStep);
        assert!(sol.uncovered.is_empty());
    }

    #[test]
    fn test_single_step_stops_even_with_uncovered_targets() {
        let g = graph();
        let t = target(&["fever", "cough", "itchy eyes"]);
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::SingleStep);
        assert_eq!(sol.explanations.len(), 1);
        assert!(!sol.uncovered.is_empty());
    }

    #[test]
    fn test_iterative_extends_until_covered() {
        let g = graph();
        let t = target(&["fever", "cough", "itchy eyes"]);
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::Iterative);
        // Flu scores 2.8, then Flu+Allergy = 3 + 0.8*0.8 = 3.64
        assert_eq!(sol.explanations, vec!["Flu", "Allergy"]);
        assert!((sol.score - 3.64).abs() < 1e-12);
        assert_eq!(sol.termination, Termination::TargetsCovered);
    }

    #[test]
    fn test_iterative_stalls_when_nothing_improves() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8)]).unwrap();
        b.add_explanation("Gout", [("joint pain", 0.9)]).unwrap();
        let g = b.build();
        let t = target(&["fever", "rash"]);
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::Iterative);
        // Flu+Gout = 1 + 0.8*0 = 1.0 < 1.8
        assert_eq!(sol.explanations, vec!["Flu"]);
        assert_eq!(sol.termination, Termination::Stalled);
        assert_eq!(sol.uncovered, target(&["rash"]));
    }

    #[test]
    fn test_iterative_exhausts_candidates() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8)]).unwrap();
        b.add_explanation("Cold", [("cough", 0.4)]).unwrap();
        let g = b.build();
        let t = target(&["fever", "cough", "rash"]);
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::Iterative);
        // Flu = 1.8, then Flu+Cold = 2 + 0.8*0.4 = 2.32; rash stays uncovered.
        assert_eq!(sol.explanations, vec!["Flu", "Cold"]);
        assert_eq!(sol.termination, Termination::CandidatesExhausted);
        assert_eq!(sol.uncovered, target(&["rash"]));
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Zika", [("fever", 0.5)]).unwrap();
        b.add_explanation("Dengue", [("fever", 0.5)]).unwrap();
        let g = b.build();
        let t = target(&["fever"]);
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::Iterative);
        assert_eq!(sol.explanations, vec!["Dengue"]);
    }

    #[test]
    fn test_empty_target_selects_nothing() {
        let g = graph();
        let t = BTreeSet::new();
        let m = Measure::new(&g, &t);
        let sol = greedy(&g, &t, &m, GreedyStrategy::SingleStep);
        assert!(sol.is_empty());
        assert_eq!(sol.score, 0.0);
        assert_eq!(sol.termination, Termination::TargetsCovered);
    }

    #[test]
    fn test_caller_target_untouched() {
        let g = graph();
        let t = target(&["fever", "cough"]);
        let m = Measure::new(&g, &t);
        let _ = greedy(&g, &t, &m, GreedyStrategy::Iterative);
        assert_eq!(t.len(), 2);
    }
}
