//! Top-M selection over (label, score) pairs.
//!
//! Keeps a bounded min-heap of size M instead of sorting the whole input.
//! Ties are broken by input order: of two equal scores the earlier entry
//! ranks higher, so a larger M always extends a smaller M's result.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::combinatorial::RankedResult;

/// A labelled score in a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub label: String,
    pub score: f64,
}

struct HeapEntry<K> {
    score: f64,
    seq: usize,
    key: K,
}

impl<K> HeapEntry<K> {
    /// Greater means "ranks higher": bigger score, then earlier position.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for HeapEntry<K> {}

impl<K> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for HeapEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

/// The `m` highest-scoring entries, best first.
pub fn rank_top_m<K, I>(entries: I, m: usize) -> Vec<(K, f64)>
where
    I: IntoIterator<Item = (K, f64)>,
{
    if m == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<HeapEntry<K>>> = BinaryHeap::with_capacity(m + 1);
    for (seq, (key, score)) in entries.into_iter().enumerate() {
        heap.push(Reverse(HeapEntry { score, seq, key }));
        if heap.len() > m {
            heap.pop();
        }
    }

    // Ascending in Reverse order is descending in rank.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(e)| (e.key, e.score))
        .collect()
}

/// Rank brute-force results by label, keeping the top `m`.
pub fn rank_results(results: &[RankedResult], m: usize) -> Vec<RankedLabel> {
    rank_top_m(results.iter().map(|r| (r.label(), r.score)), m)
        .into_iter()
        .map(|(label, score)| RankedLabel { label, score })
        .collect()
}
