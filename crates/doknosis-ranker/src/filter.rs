//! Candidate filtering ahead of graph construction.
//!
//! An explanation survives when:
//! - its category is in the requested group (case-insensitive),
//! - it has at least one edge to a target finding,
//! - none of its edges to a target finding has weight 0,
//! - it carries no regions, or shares one with the request.
//!
//! Keeping the pool small here is what keeps `brute_n` tractable.

use std::collections::{BTreeMap, BTreeSet};

use doknosis_common::entities::ExplanationRecord;
use doknosis_common::normalise::normalise_name;

/// Request-side filter criteria.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFilter<'a> {
    /// `None` accepts every category.
    pub categories: Option<&'a [String]>,
    pub target: &'a BTreeSet<String>,
    /// `None` disables the region check.
    pub regions: Option<&'a [String]>,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(target: &'a BTreeSet<String>) -> Self {
        Self { categories: None, target, regions: None }
    }

    pub fn with_categories(mut self, categories: &'a [String]) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_regions(mut self, regions: &'a [String]) -> Self {
        self.regions = Some(regions);
        self
    }

    pub fn category_matches(&self, category: &str) -> bool {
        match self.categories {
            None => true,
            Some(group) => group.iter().any(|c| c.trim().eq_ignore_ascii_case(category.trim())),
        }
    }

    /// At least one edge into the target and no zero-weight edge into it.
    /// Finding names are normalised and a repeated finding keeps its last
    /// weight, the same way the graph reads the record.
    pub fn findings_match<R: ExplanationRecord + ?Sized>(&self, record: &R) -> bool {
        let edges: BTreeMap<String, f64> = record
            .findings()
            .map(|(finding, weight)| (normalise_name(finding), weight))
            .collect();
        let mut touches = false;
        for (finding, weight) in &edges {
            if self.target.contains(finding) {
                if *weight == 0.0 {
                    return false;
                }
                touches = true;
            }
        }
        touches
    }

    pub fn region_matches(&self, own: &[String]) -> bool {
        let Some(wanted) = self.regions else {
            return true;
        };
        if own.is_empty() {
            return true;
        }
        own.iter()
            .map(|r| normalise_name(r))
            .any(|r| wanted.iter().any(|w| normalise_name(w) == r))
    }

    pub fn accepts<R: ExplanationRecord + ?Sized>(&self, record: &R) -> bool {
        self.category_matches(record.category())
            && self.findings_match(record)
            && self.region_matches(record.regions())
    }

    /// Keep the accepted records, in input order.
    pub fn apply<R: ExplanationRecord>(&self, records: Vec<R>) -> Vec<R> {
        let fetched = records.len();
        let kept: Vec<R> = records.into_iter().filter(|r| self.accepts(r)).collect();
        tracing::debug!(fetched, kept = kept.len(), "Candidate filter applied");
        kept
    }
}
