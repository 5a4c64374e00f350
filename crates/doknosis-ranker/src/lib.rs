//! doknosis-ranker — Explanation ranking engine.
//!
//! Ranks candidate explanations (diseases, drugs, ...) against a set of
//! observed findings over a weighted bipartite graph. Three strategies share
//! the graph: greedy set cover plus brute-force combination search, a
//! naive-Bayes posterior ranking, and a fuzzy greedy variant that accepts
//! free-text phrases.

pub mod error;
pub mod graph;
pub mod measure;
pub mod greedy;
pub mod combinatorial;
pub mod top_m;
pub mod bayesian;
pub mod lcs;
pub mod fuzzy;
pub mod filter;
pub mod source;
pub mod engine;

pub use engine::{Algorithm, Engine, RankingOutcome, RankingRequest};
pub use error::{RankingError, Result};
pub use graph::{ExplanationGraph, GraphBuilder};
pub use measure::Measure;
