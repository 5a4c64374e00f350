//! Weighted bipartite explanation graph: `explanation -> {finding -> weight}`.
//!
//! Built fresh for every ranking request and never mutated afterwards.
//! Explanation names keep their original spelling; finding names are
//! normalised. Iteration is always in name order, so everything downstream
//! (greedy tie-breaks, combination enumeration) is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use doknosis_common::entities::{is_valid_weight, ExplanationRecord};
use doknosis_common::normalise::normalise_name;
use doknosis_common::DoknosisError;

use crate::error::Result;

pub type FindingEdges = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplanationGraph {
    edges: BTreeMap<String, FindingEdges>,
}

impl ExplanationGraph {
    /// Build a graph from explanation records. Any malformed edge aborts the build.
    pub fn build<R: ExplanationRecord>(records: &[R]) -> Result<Self> {
        let mut builder = GraphBuilder::new();
        for record in records {
            builder.add_record(record)?;
        }
        Ok(builder.build())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, explanation: &str) -> bool {
        self.edges.contains_key(explanation)
    }

    /// Explanation names in sorted order.
    pub fn explanations(&self) -> impl Iterator<Item = &str> + '_ {
        self.edges.keys().map(String::as_str)
    }

    /// Edges of one explanation. `None` if the explanation is unknown.
    pub fn findings_of(&self, explanation: &str) -> Option<&FindingEdges> {
        self.edges.get(explanation)
    }

    /// Edge weight, `None` when there is no edge.
    pub fn weight(&self, explanation: &str, finding: &str) -> Option<f64> {
        self.edges.get(explanation)?.get(finding).copied()
    }

    /// Edge weight with a missing edge read as 0.
    pub fn weight_or_zero(&self, explanation: &str, finding: &str) -> f64 {
        self.weight(explanation, finding).unwrap_or(0.0)
    }

    /// Every finding named by any explanation, sorted and de-duplicated.
    pub fn finding_vocabulary(&self) -> Vec<String> {
        self.edges
            .values()
            .flat_map(|edges| edges.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Explanation and finding names together: every vertex of the bipartite graph.
    pub fn vertices(&self) -> BTreeSet<&str> {
        self.edges
            .iter()
            .flat_map(|(e, edges)| std::iter::once(e.as_str()).chain(edges.keys().map(String::as_str)))
            .collect()
    }
}

/// Incremental graph construction with edge validation.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    edges: BTreeMap<String, FindingEdges>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record<R: ExplanationRecord + ?Sized>(&mut self, record: &R) -> Result<&mut Self> {
        self.add_explanation(record.name(), record.findings())
    }

    /// Add one explanation with its edges. Duplicate findings: last write wins.
    /// A repeated explanation name replaces the earlier entry.
    pub fn add_explanation<'a>(
        &mut self,
        name: &str,
        findings: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<&mut Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DoknosisError::EmptyName("explanation name".to_string()).into());
        }

        let mut edges = FindingEdges::new();
        for (finding, weight) in findings {
            let finding = normalise_name(finding);
            if finding.is_empty() {
                return Err(DoknosisError::EmptyName(format!("finding of {name}")).into());
            }
            if !is_valid_weight(weight) {
                return Err(DoknosisError::MalformedEdge {
                    explanation: name.to_string(),
                    finding,
                    weight,
                }
                .into());
            }
            edges.insert(finding, weight);
        }

        if self.edges.insert(name.to_string(), edges).is_some() {
            tracing::debug!(explanation = name, "Duplicate explanation replaced");
        }
        Ok(self)
    }

    pub fn build(self) -> ExplanationGraph {
        ExplanationGraph { edges: self.edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RankingError;
    use doknosis_common::Explanation;

    fn flu_cold() -> ExplanationGraph {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.8), ("cough", 0.6)]).unwrap();
        b.add_explanation("Cold", [("cough", 0.4), ("sneeze", 0.7)]).unwrap();
        b.build()
    }

    #[test]
    fn test_build_from_records() {
        let records = vec![
            Explanation::new("Flu", "Disease")
                .with_finding("Fever", 0.8).unwrap()
                .with_finding("cough", 0.6).unwrap(),
            Explanation::new("Cold", "Disease")
                .with_finding("cough", 0.4).unwrap(),
        ];
        let g = ExplanationGraph::build(&records).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.weight("Flu", "fever"), Some(0.8));
        assert_eq!(g.weight("Cold", "fever"), None);
        assert_eq!(g.weight_or_zero("Cold", "fever"), 0.0);
    }

    #[test]
    fn test_duplicate_finding_last_write_wins() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Flu", [("fever", 0.2), ("Fever ", 0.9)]).unwrap();
        let g = b.build();
        assert_eq!(g.weight("Flu", "fever"), Some(0.9));
        assert_eq!(g.findings_of("Flu").unwrap().len(), 1);
    }

    #[test]
    fn test_explanation_without_findings_is_legal() {
        let mut b = GraphBuilder::new();
        b.add_explanation("Idiopathic", std::iter::empty()).unwrap();
        let g = b.build();
        assert!(g.contains("Idiopathic"));
        assert!(g.findings_of("Idiopathic").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_weight_rejected() {
        let mut b = GraphBuilder::new();
        let err = b.add_explanation("Flu", [("fever", 1.5)]).unwrap_err();
        assert!(matches!(
            err,
            RankingError::Data(DoknosisError::MalformedEdge { ref explanation, .. }) if explanation == "Flu"
        ));
        assert!(b.add_explanation("Flu", [("fever", f64::INFINITY)]).is_err());
        assert!(b.add_explanation("  ", [("fever", 0.5)]).is_err());
    }

    #[test]
    fn test_explanations_sorted() {
        let g = flu_cold();
        let names: Vec<_> = g.explanations().collect();
        assert_eq!(names, vec!["Cold", "Flu"]);
    }

    #[test]
    fn test_vocabulary_and_vertices() {
        let g = flu_cold();
        assert_eq!(g.finding_vocabulary(), vec!["cough", "fever", "sneeze"]);
        let v: Vec<_> = g.vertices().into_iter().collect();
        assert_eq!(v, vec!["Cold", "Flu", "cough", "fever", "sneeze"]);
    }
}
