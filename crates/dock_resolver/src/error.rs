//! Error types for entry-point resolution.

use dock_module::Protocol;
use thiserror::Error;

use crate::category::{supported_patterns, PatternCategory};

/// Result type alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Why a module has no single deployable entry point.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(
        "No valid entry point found in '{module}'. Supported patterns:\n{}\n   Use all: [<name>] to select one export if several exist.",
        supported_patterns(.protocol)
    )]
    NoPatternFound { module: String, protocol: Protocol },

    #[error("{}", ambiguity_message(.category, .protocol, .candidates))]
    AmbiguousPattern {
        category: PatternCategory,
        protocol: Protocol,
        candidates: Vec<String>,
    },

    #[error("{}", overlap_message(.name, .protocol, .categories))]
    OverlappingPattern {
        name: String,
        protocol: Protocol,
        categories: Vec<PatternCategory>,
    },
}

impl ResolveError {
    /// Whether more than one export could be the entry point.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            ResolveError::AmbiguousPattern { .. } | ResolveError::OverlappingPattern { .. }
        )
    }
}

fn ambiguity_message(
    category: &PatternCategory,
    protocol: &Protocol,
    candidates: &[String],
) -> String {
    let first = candidates.first().map(String::as_str).unwrap_or("<name>");
    format!(
        "Multiple {}s found: [{}]. Declare exactly one entry point with all: [{}]",
        category.label(*protocol),
        candidates.join(", "),
        first
    )
}

fn overlap_message(name: &str, protocol: &Protocol, categories: &[PatternCategory]) -> String {
    let labels: Vec<String> = categories.iter().map(|c| c.label(*protocol)).collect();
    format!(
        "Export '{}' matches several patterns equally ({}). Rename it or declare exactly one entry point with all: [<name>]",
        name,
        labels.join(", ")
    )
}
