//! Trait for explanation record access.
//!
//! The engine never talks to a store directly. Whatever holds the records
//! (a database, a spreadsheet import, a fixture) sits behind this trait.

use doknosis_common::entities::ExplanationRecord;
use doknosis_common::normalise::normalise_name;
use doknosis_common::Explanation;

/// Read-only access to explanation records.
pub trait ExplanationSource: Send + Sync {
    /// Records whose category is one of `categories` and that have an edge to
    /// at least one of `findings`. `None` disables the respective check.
    ///
    /// Implementations may return a superset; the engine filters again.
    fn fetch(
        &self,
        categories: Option<&[String]>,
        findings: Option<&[String]>,
    ) -> anyhow::Result<Vec<Explanation>>;
}

// ── In-memory Implementation ────────────────────────────────────────────────

/// Source backed by a vector of records.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<Explanation>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, explanation: Explanation) -> Self {
        self.records.push(explanation);
        self
    }

    pub fn from_records(records: Vec<Explanation>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ExplanationSource for InMemorySource {
    fn fetch(
        &self,
        categories: Option<&[String]>,
        findings: Option<&[String]>,
    ) -> anyhow::Result<Vec<Explanation>> {
        let wanted: Option<Vec<String>> = findings.map(|f| f.iter().map(|n| normalise_name(n)).collect());
        Ok(self
            .records
            .iter()
            .filter(|e| {
                categories.map_or(true, |group| {
                    group.iter().any(|c| c.trim().eq_ignore_ascii_case(e.category.trim()))
                })
            })
            .filter(|e| {
                wanted.as_ref().map_or(true, |w| e.findings().any(|(f, _)| w.contains(&normalise_name(f))))
            })
            .cloned()
            .collect())
    }
}

impl<S: ExplanationSource + ?Sized> ExplanationSource for &S {
    fn fetch(
        &self,
        categories: Option<&[String]>,
        findings: Option<&[String]>,
    ) -> anyhow::Result<Vec<Explanation>> {
        (**self).fetch(categories, findings)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use doknosis_common::FindingWeight;

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with(Explanation::new("Flu", "Infectious disease").with_finding("fever", 0.8).unwrap())
            .with(Explanation::new("Cold", "Infectious disease").with_finding("sneeze", 0.7).unwrap())
            .with(Explanation::new("Aspirin", "Drug").with_finding("fever", 0.3).unwrap())
    }

    #[test]
    fn test_fetch_everything() {
        let all = source().fetch(None, None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_fetch_by_category() {
        let group = vec!["drug".to_string()];
        let found = source().fetch(Some(&group), None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Aspirin");
    }

    #[test]
    fn test_fetch_by_findings() {
        let findings = vec![" Fever".to_string()];
        let found = source().fetch(None, Some(findings.as_slice())).unwrap();
        let names: Vec<_> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Aspirin"]);
    }

    #[test]
    fn test_fetch_matches_unnormalised_record_names() {
        let mut flu = Explanation::new("Flu", "Infectious disease");
        flu.findings.push(FindingWeight { name: "Night  Sweats".to_string(), weight: 0.4 });
        let s = InMemorySource::new().with(flu);
        let findings = vec!["night sweats".to_string()];
        assert_eq!(s.fetch(None, Some(findings.as_slice())).unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_through_reference() {
        let s = source();
        let by_ref = &s;
        assert_eq!(by_ref.fetch(None, None).unwrap().len(), s.len());
    }
}
