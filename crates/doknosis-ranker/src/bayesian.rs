//! Naive-Bayes posterior ranking of single explanations.
//!
//! posterior(e) = prior * Π_{f in target} P(f | e)
//!
//! The prior is a flat 0.5 (no demographic model). A missing edge is read as
//! 0.5 here, unlike the 0 used by the coverage measure. That default is known
//! to overweight missing edges.

use std::collections::BTreeSet;

use crate::graph::ExplanationGraph;
use crate::top_m::{rank_top_m, RankedLabel};

/// Flat prior for every explanation.
pub const PRIOR: f64 = 0.5;

/// Likelihood used when an explanation has no edge to a target finding.
pub const MISSING_EDGE_LIKELIHOOD: f64 = 0.5;

/// Posterior score of one explanation.
pub fn posterior(graph: &ExplanationGraph, explanation: &str, target: &BTreeSet<String>) -> f64 {
    PRIOR
        * target
            .iter()
            .map(|f| graph.weight(explanation, f).unwrap_or(MISSING_EDGE_LIKELIHOOD))
            .product::<f64>()
}

/// Posteriors for every explanation in the graph, in name order.
pub fn posteriors(graph: &ExplanationGraph, target: &BTreeSet<String>) -> Vec<(String, f64)> {
    graph
        .explanations()
        .map(|e| (e.to_string(), posterior(graph, e, target)))
        .collect()
}

/// Divide each score by the sum of all scores. A zero sum leaves everything at 0.
pub fn normalise_posteriors(scores: &mut [(String, f64)]) {
    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    for (_, s) in scores.iter_mut() {
        *s = if total > 0.0 { *s / total } else { 0.0 };
    }
}

/// Top `m` explanations by posterior.
pub fn rank_bayesian(
    graph: &ExplanationGraph,
    target: &BTreeSet<String>,
    m: usize,
    normalise: bool,
) -> Vec<RankedLabel> {
    let mut scores = posteriors(graph, target);
    if normalise {
        normalise_posteriors(&mut scores);
    }
    rank_top_m(scores, m)
        .into_iter()
        .map(|(label, score)| RankedLabel { label, score })
        .collect()
}
