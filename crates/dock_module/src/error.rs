//! Error types for the module crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors that can occur while reading or inspecting an agent module.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Agent file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid module file {path}: {message}")]
    InvalidModule { path: PathBuf, message: String },

    #[error("Invalid module path '{0}': expected dotted identifiers (e.g. agents.financial_agent)")]
    InvalidModulePath(String),

    #[error("Module '{module}' has no attribute '{name}'")]
    MissingExport { module: String, name: String },

    #[error("Invalid export '{name}': {message}")]
    InvalidExport { name: String, message: String },

    #[error("{name}() raised an error: {message}")]
    Invocation { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
