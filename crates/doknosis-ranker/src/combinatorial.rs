//! Brute-force ranking of every size-n explanation combination.
//!
//! Exponential in the candidate count for fixed n; callers pre-filter the
//! candidate pool before reaching this.

use serde::{Deserialize, Serialize};

use doknosis_common::normalise::join_label;

use crate::graph::ExplanationGraph;
use crate::measure::Measure;

/// A scored explanation combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub score: f64,
    pub explanations: Vec<String>,
}

impl RankedResult {
    /// Human-readable label, e.g. "Cold, Flu".
    pub fn label(&self) -> String {
        join_label(&self.explanations)
    }
}

/// Lexicographic r-combinations of a slice, yielded as index-ordered vectors.
/// `r == 0` or `r > pool.len()` yields nothing.
pub struct Combinations<'a, T> {
    pool: &'a [T],
    indices: Vec<usize>,
    first: bool,
    done: bool,
}

impl<'a, T> Combinations<'a, T> {
    pub fn new(pool: &'a [T], r: usize) -> Self {
        Self {
            pool,
            indices: (0..r).collect(),
            first: true,
            done: r == 0 || r > pool.len(),
        }
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.first {
            self.first = false;
        } else {
            let n = self.pool.len();
            let r = self.indices.len();
            // Rightmost index that can still move.
            let Some(i) = (0..r).rev().find(|&i| self.indices[i] != i + n - r) else {
                self.done = true;
                return None;
            };
            self.indices[i] += 1;
            for j in i + 1..r {
                self.indices[j] = self.indices[j - 1] + 1;
            }
        }
        Some(self.indices.iter().map(|&i| &self.pool[i]).collect())
    }
}

/// Number of r-combinations of n items, saturating at `u64::MAX`.
pub fn combination_count(n: usize, r: usize) -> u64 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r) as u64;
    let n = n as u64;
    (0..r).fold(1u64, |acc, i| {
        acc.checked_mul(n - i).map(|v| v / (i + 1)).unwrap_or(u64::MAX)
    })
}

/// Score every n-combination of the graph's explanations and sort by score,
/// descending. Ties keep enumeration order (combinations of sorted names).
/// `n` of 0 or above the explanation count yields an empty list.
pub fn brute_n(graph: &ExplanationGraph, measure: &Measure<'_>, n: usize) -> Vec<RankedResult> {
    let names: Vec<&str> = graph.explanations().collect();
    tracing::debug!(
        size = n,
        candidates = names.len(),
        combinations = combination_count(names.len(), n),
        "Brute-force ranking"
    );

    let mut ranked: Vec<RankedResult> = Combinations::new(&names, n)
        .map(|combo| {
            let members: Vec<&str> = combo.into_iter().copied().collect();
            RankedResult {
                score: measure.score(&members),
                explanations: members.into_iter().map(str::to_string).collect(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::collections::BTreeSet;

    #[test]
    fn test_combinations_order() {
        let pool = ["a", "b", "c", "d"];
        let combos: Vec<String> = Combinations::new(&pool, 2)
            .map(|c| c.into_iter().copied().collect::<String>())
            .collect();
        assert_eq!(combos, vec!["ab", "ac", "ad", "bc", "bd", "cd"]);
    }

    #[test]
    fn test_combinations_edges() {
        let pool = [1, 2, 3];
        assert_eq!(Combinations::new(&pool, 3).count(), 1);
        assert_eq!(Combinations::new(&pool, 4).count(), 0);
        assert_eq!(Combinations::new(&pool, 0).count(), 0);
        assert_eq!(Combinations::new(&pool, 1).count(), 3);
    }

    #[test]
    fn test_combination_count() {
        assert_eq!(combination_count(4, 2), 6);
        assert_eq!(combination_count(10, 3), 120);
        assert_eq!(combination_count(3, 5), 0);
        assert_eq!(combination_count(5, 0), 1);
    }

    #[test]
    fn test_brute_n_sorted_descending() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8), ("cough", 0.6)]).unwrap();
        b.add_explanation("Cold", [("cough", 0.4), ("sneeze", 0.7)]).unwrap();
        b.add_explanation("Measles", [("rash", 0.9), ("fever", 0.5)]).unwrap();
        let g = b.build();
        let t: BTreeSet<String> = ["fever", "cough", "sneeze"].iter().map(|s| s.to_string()).collect();
        let m = Measure::new(&g, &t);

        let ranked = brute_n(&g, &m, 1);
        let labels: Vec<String> = ranked.iter().map(RankedResult::label).collect();
        assert_eq!(labels, vec!["Flu", "Cold", "Measles"]);

        let pairs = brute_n(&g, &m, 2);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].label(), "Cold, Flu");
        assert!((pairs[0].score - 3.56).abs() < 1e-12);
        assert!(pairs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_brute_n_too_large_is_empty() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8)]).unwrap();
        let g = b.build();
        let t: BTreeSet<String> = ["fever".to_string()].into_iter().collect();
        let m = Measure::new(&g, &t);
        assert!(brute_n(&g, &m, 2).is_empty());
        assert!(brute_n(&g, &m, 0).is_empty());
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let mut b = GraphBuilder::new();
        b.add_explanation("B", [("x", 0.5)]).unwrap();
        b.add_explanation("A", [("x", 0.5)]).unwrap();
        b.add_explanation("C", [("x", 0.5)]).unwrap();
        let g = b.build();
        let t: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        let m = Measure::new(&g, &t);
        let labels: Vec<String> = brute_n(&g, &m, 1).iter().map(RankedResult::label).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }
}
