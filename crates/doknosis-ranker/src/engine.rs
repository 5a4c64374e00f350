//! Request-level ranking engine.
//!
//! Fetches explanation records from an [`ExplanationSource`], filters them to
//! a candidate pool, builds a fresh graph and runs one of the three ranking
//! strategies. Nothing survives between requests.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use doknosis_common::normalise::{join_label, normalise_name, split_finding_list};
use doknosis_common::{EngineConfig, Explanation};
use serde::{Deserialize, Deserializer, Serialize};

use crate::bayesian::rank_bayesian;
use crate::combinatorial::brute_n;
use crate::error::{RankingError, Result};
use crate::filter::CandidateFilter;
use crate::fuzzy::{run_fuzzy, FuzzyOutcome};
use crate::graph::ExplanationGraph;
use crate::greedy::greedy;
use crate::measure::Measure;
use crate::source::ExplanationSource;
use crate::top_m::{rank_results, RankedLabel};

// ── Algorithm ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Greedy set cover plus brute-force combinations.
    Hybrid,
    Bayesian,
    Fuzzy,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hybrid => "hybrid",
            Algorithm::Bayesian => "bayesian",
            Algorithm::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the names above and the numeric codes `1`, `2`, `3`.
impl FromStr for Algorithm {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        match normalise_name(s).as_str() {
            "1" | "hybrid" | "greedy" => Ok(Algorithm::Hybrid),
            "2" | "bayesian" | "bayes" => Ok(Algorithm::Bayesian),
            "3" | "fuzzy" => Ok(Algorithm::Fuzzy),
            other => Err(RankingError::InvalidParameter(format!("unknown algorithm {other:?}"))),
        }
    }
}

// ── Request ─────────────────────────────────────────────────────────────────

/// One ranking request. Unset fields fall back to the engine's config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingRequest {
    /// Normalised, de-duplicated, in entry order.
    #[serde(deserialize_with = "deserialize_findings")]
    pub findings: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub num_solutions: Option<usize>,
    #[serde(default)]
    pub num_combinations: Option<usize>,
}

impl RankingRequest {
    pub fn new<I, S>(findings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { findings: normalise_findings(findings), ..Self::default() }
    }

    /// Findings from free text separated by commas, semicolons or newlines.
    pub fn from_text(text: &str) -> Self {
        Self::new(split_finding_list(text))
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.regions = Some(regions.into_iter().map(|r| normalise_name(r.as_ref())).collect());
        self
    }

    pub fn with_num_solutions(mut self, n: usize) -> Self {
        self.num_solutions = Some(n);
        self
    }

    pub fn with_num_combinations(mut self, n: usize) -> Self {
        self.num_combinations = Some(n);
        self
    }

    pub fn target(&self) -> BTreeSet<String> {
        self.findings.iter().cloned().collect()
    }
}

fn normalise_findings<I, S>(findings: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalised: Vec<String> = Vec::new();
    for f in findings {
        let f = normalise_name(f.as_ref());
        if !f.is_empty() && !normalised.contains(&f) {
            normalised.push(f);
        }
    }
    normalised
}

fn deserialize_findings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(normalise_findings(raw))
}

/// Request fields after defaults are applied.
#[derive(Debug, Clone)]
struct Resolved {
    category: String,
    /// `None` selects every category.
    categories: Option<Vec<String>>,
    num_solutions: usize,
    num_combinations: usize,
}

// ── Outcomes ────────────────────────────────────────────────────────────────

/// Ranked combinations of one size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRanking {
    pub size: usize,
    pub ranked: Vec<RankedLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridOutcome {
    /// Label of the greedy pick; `None` when greedy selected nothing.
    pub greedy_solution: Option<String>,
    /// One entry per size in `1..=num_combinations`.
    pub rankings: Vec<SizeRanking>,
    pub query_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesianOutcome {
    pub best: String,
    pub ranked: Vec<RankedLabel>,
    pub query_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum RankingOutcome {
    Hybrid(HybridOutcome),
    Bayesian(BayesianOutcome),
    Fuzzy(FuzzyOutcome),
}

impl RankingOutcome {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            RankingOutcome::Hybrid(_) => Algorithm::Hybrid,
            RankingOutcome::Bayesian(_) => Algorithm::Bayesian,
            RankingOutcome::Fuzzy(_) => Algorithm::Fuzzy,
        }
    }

    pub fn query_time_ms(&self) -> f64 {
        match self {
            RankingOutcome::Hybrid(o) => o.query_time_ms,
            RankingOutcome::Bayesian(o) => o.query_time_ms,
            RankingOutcome::Fuzzy(o) => o.query_time_ms,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| doknosis_common::DoknosisError::from(e).into())
    }
}

// ── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine<S: ExplanationSource> {
    config: EngineConfig,
    source: S,
}

impl<S: ExplanationSource> Engine<S> {
    pub fn new(source: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn with_default_config(source: S) -> Self {
        Self { config: EngineConfig::default(), source }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn run(&self, algorithm: Algorithm, request: &RankingRequest) -> Result<RankingOutcome> {
        tracing::info!(
            %algorithm,
            category = request.category.as_deref().unwrap_or(&self.config.defaults.category),
            findings = request.findings.len(),
            "Ranking request received"
        );
        let outcome = match algorithm {
            Algorithm::Hybrid => RankingOutcome::Hybrid(self.run_hybrid(request)?),
            Algorithm::Bayesian => RankingOutcome::Bayesian(self.run_bayesian(request)?),
            Algorithm::Fuzzy => RankingOutcome::Fuzzy(self.run_fuzzy(request)?),
        };
        tracing::info!(%algorithm, query_time_ms = outcome.query_time_ms(), "Ranking request complete");
        Ok(outcome)
    }

    /// Greedy pick plus brute-force rankings for every size up to `num_combinations`.
    pub fn run_hybrid(&self, request: &RankingRequest) -> Result<HybridOutcome> {
        let resolved = self.resolve(request)?;
        let target = request.target();
        let (candidates, query_time_ms) = self.fetch_candidates(request, &resolved, &target)?;
        let graph = ExplanationGraph::build(&candidates)?;
        let measure = Measure::new(&graph, &target);

        let solution = greedy(&graph, &target, &measure, self.config.greedy.strategy);
        let greedy_solution = if solution.is_empty() {
            tracing::warn!(category = %resolved.category, "Greedy selected no explanation");
            None
        } else {
            Some(join_label(&solution.explanations))
        };

        let rankings: Vec<SizeRanking> = (1..=resolved.num_combinations)
            .map(|size| SizeRanking {
                size,
                ranked: rank_results(&brute_n(&graph, &measure, size), resolved.num_solutions),
            })
            .collect();

        tracing::info!(
            candidates = graph.len(),
            sizes = rankings.len(),
            greedy = greedy_solution.as_deref().unwrap_or(""),
            "Hybrid ranking done"
        );
        Ok(HybridOutcome { greedy_solution, rankings, query_time_ms })
    }

    /// Single explanations ranked by naive-Bayes posterior.
    pub fn run_bayesian(&self, request: &RankingRequest) -> Result<BayesianOutcome> {
        let resolved = self.resolve(request)?;
        let target = request.target();
        let (candidates, query_time_ms) = self.fetch_candidates(request, &resolved, &target)?;
        let graph = ExplanationGraph::build(&candidates)?;

        let ranked = rank_bayesian(&graph, &target, resolved.num_solutions, self.config.bayesian.normalise);
        let best = ranked
            .first()
            .map(|r| r.label.clone())
            .ok_or_else(|| self.no_candidates(&resolved, request))?;

        tracing::info!(candidates = graph.len(), best = %best, "Bayesian ranking done");
        Ok(BayesianOutcome { best, ranked, query_time_ms })
    }

    /// Fuzzy greedy over every explanation of the category. Findings are free-text phrases.
    pub fn run_fuzzy(&self, request: &RankingRequest) -> Result<FuzzyOutcome> {
        let resolved = self.resolve(request)?;
        if request.findings.is_empty() {
            return Err(RankingError::EmptyTarget);
        }

        let start = Instant::now();
        let fetched = self.source.fetch(resolved.categories.as_deref(), None)?;
        let query_time_ms = elapsed_ms(start);

        let target = request.target();
        let mut filter = CandidateFilter::new(&target);
        if let Some(group) = resolved.categories.as_deref() {
            filter = filter.with_categories(group);
        }
        if let Some(regions) = request.regions.as_deref() {
            filter = filter.with_regions(regions);
        }
        let candidates: Vec<Explanation> = fetched
            .into_iter()
            .filter(|e| filter.category_matches(&e.category) && filter.region_matches(&e.regions))
            .collect();
        if candidates.is_empty() {
            return Err(self.no_candidates(&resolved, request));
        }

        let graph = ExplanationGraph::build(&candidates)?;
        let mut outcome = run_fuzzy(&graph, &request.findings, &self.config.fuzzy)?;
        outcome.query_time_ms = query_time_ms;

        tracing::info!(
            candidates = graph.len(),
            selected = outcome.solution.len(),
            coverage_ratio = outcome.coverage_ratio,
            "Fuzzy ranking done"
        );
        Ok(outcome)
    }

    fn resolve(&self, request: &RankingRequest) -> Result<Resolved> {
        let defaults = &self.config.defaults;
        let num_solutions = request.num_solutions.unwrap_or(defaults.num_solutions);
        let num_combinations = request.num_combinations.unwrap_or(defaults.num_combinations);
        if num_solutions == 0 {
            return Err(RankingError::InvalidParameter("num_solutions must be at least 1".into()));
        }
        if num_combinations == 0 {
            return Err(RankingError::InvalidParameter("num_combinations must be at least 1".into()));
        }

        let category = request
            .category
            .clone()
            .unwrap_or_else(|| defaults.category.clone());
        let categories = self.config.categories_for(&category);
        Ok(Resolved { category, categories, num_solutions, num_combinations })
    }

    /// Fetch and filter the candidate pool. Returns the survivors and the fetch time.
    fn fetch_candidates(
        &self,
        request: &RankingRequest,
        resolved: &Resolved,
        target: &BTreeSet<String>,
    ) -> Result<(Vec<Explanation>, f64)> {
        if target.is_empty() {
            return Err(RankingError::EmptyTarget);
        }

        let start = Instant::now();
        let fetched = self
            .source
            .fetch(resolved.categories.as_deref(), Some(request.findings.as_slice()))?;
        let query_time_ms = elapsed_ms(start);

        let mut filter = CandidateFilter::new(target);
        if let Some(group) = resolved.categories.as_deref() {
            filter = filter.with_categories(group);
        }
        if let Some(regions) = request.regions.as_deref() {
            filter = filter.with_regions(regions);
        }
        let candidates = filter.apply(fetched);
        tracing::info!(
            category = %resolved.category,
            candidates = candidates.len(),
            query_time_ms,
            "Candidate pool ready"
        );

        if candidates.is_empty() {
            return Err(self.no_candidates(resolved, request));
        }
        Ok((candidates, query_time_ms))
    }

    fn no_candidates(&self, resolved: &Resolved, request: &RankingRequest) -> RankingError {
        RankingError::NoCandidates {
            category: resolved.category.clone(),
            findings: request.findings.clone(),
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
