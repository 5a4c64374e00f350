//! Finding-name normalisation.
//!
//! Finding names are identities only, so every name entering the engine is
//! trimmed, case-folded and has its inner whitespace collapsed before it is
//! used as a key.

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,;\r\n]+").unwrap())
}

/// Normalise a finding name: trim, lower-case, collapse runs of whitespace.
pub fn normalise_name(raw: &str) -> String {
    whitespace_re()
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

/// Split a free-text finding list ("fever, cough; rash") into normalised
/// names. Blank entries are dropped.
pub fn split_finding_list(text: &str) -> Vec<String> {
    separator_re()
        .split(text)
        .map(normalise_name)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join explanation names into the human-readable label used in ranked lists.
pub fn join_label<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
