//! Shared fixtures and helpers for Doknosis tests.

use doknosis_common::Explanation;

/// Install a `RUST_LOG`-driven fmt subscriber for test output. Safe to call
/// from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assert two floats agree to within `1e-9`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// The two-explanation graph used throughout the ranking scenarios.
pub fn flu_cold_records() -> Vec<Explanation> {
    vec![
        explanation("Flu", "Infectious disease", &["fever:0.8", "cough:0.6"]),
        explanation("Cold", "Infectious disease", &["cough:0.4", "sneeze:0.7"]),
    ]
}

/// A small regional catalogue with one drug mixed in.
pub fn tropical_catalog() -> Vec<Explanation> {
    catalog_from_json(TROPICAL_CATALOG)
}

/// Parse a JSON array of explanation records. Panics on malformed input.
pub fn catalog_from_json(json: &str) -> Vec<Explanation> {
    serde_json::from_str(json).expect("fixture catalogue is valid JSON")
}

fn explanation(name: &str, category: &str, findings: &[&str]) -> Explanation {
    Explanation::new(name, category)
        .with_findings_str(findings.iter().copied())
        .expect("fixture findings are well formed")
}

const TROPICAL_CATALOG: &str = r#"[
  {
    "name": "Malaria",
    "category": "Infectious disease",
    "findings": [
      { "name": "fever", "weight": 0.9 },
      { "name": "chills", "weight": 0.8 },
      { "name": "headache", "weight": 0.5 }
    ],
    "regions": ["africa", "asia"]
  },
  {
    "name": "Dengue",
    "category": "Infectious disease",
    "findings": [
      { "name": "fever", "weight": 0.85 },
      { "name": "rash", "weight": 0.6 },
      { "name": "joint pain", "weight": 0.7 }
    ],
    "regions": ["asia", "south america"]
  },
  {
    "name": "Typhoid",
    "category": "Infectious disease",
    "findings": [
      { "name": "fever", "weight": 0.7 },
      { "name": "abdominal pain", "weight": 0.6 },
      { "name": "headache", "weight": 0.4 }
    ],
    "regions": ["asia", "africa"]
  },
  {
    "name": "Tuberculosis",
    "category": "Infectious disease",
    "findings": [
      { "name": "cough", "weight": 0.9 },
      { "name": "night sweats", "weight": 0.6 },
      { "name": "fever", "weight": 0.3 }
    ]
  },
  {
    "name": "Influenza",
    "category": "Infectious disease",
    "findings": [
      { "name": "fever", "weight": 0.8 },
      { "name": "cough", "weight": 0.6 },
      { "name": "headache", "weight": 0.3 },
      { "name": "rash", "weight": 0.0 }
    ]
  },
  {
    "name": "Paracetamol",
    "category": "Drug",
    "findings": [
      { "name": "rash", "weight": 0.1 }
    ]
  }
]"#;
