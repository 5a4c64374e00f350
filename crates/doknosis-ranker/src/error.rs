//! Error types for the ranking engine.

use doknosis_common::DoknosisError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RankingError>;

#[derive(Error, Debug)]
pub enum RankingError {
    #[error("No candidate explanations of type {category:?} for findings {findings:?}")]
    NoCandidates {
        category: String,
        findings: Vec<String>,
    },

    #[error("No target findings supplied")]
    EmptyTarget,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Explanation source error: {0}")]
    Source(String),

    #[error(transparent)]
    Data(#[from] DoknosisError),
}

impl From<anyhow::Error> for RankingError {
    fn from(e: anyhow::Error) -> Self {
        RankingError::Source(format!("{e:#}"))
    }
}
