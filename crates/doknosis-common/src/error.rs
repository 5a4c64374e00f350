use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoknosisError {
    #[error("Malformed edge {explanation} -> {finding}: weight {weight} is not a finite value in [0, 1]")]
    MalformedEdge {
        explanation: String,
        finding: String,
        weight: f64,
    },

    #[error("Finding \"{finding}\": weight \"{raw}\" is not a number")]
    UnparsableWeight { finding: String, raw: String },

    #[error("Empty name: {0}")]
    EmptyName(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DoknosisError>;
