//! doknosis-common — Shared types, errors and configuration used across all Doknosis crates.

pub mod error;
pub mod entities;
pub mod normalise;
pub mod config;

// Re-export commonly used types
pub use config::{EngineConfig, GreedyStrategy};
pub use entities::{Explanation, ExplanationRecord, FindingWeight};
pub use error::{DoknosisError, Result};
