//! Error types for deployment preparation.

use std::path::PathBuf;

use dock_module::ModuleError;
use dock_resolver::ResolveError;
use thiserror::Error;

/// Result type alias for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while preparing a deployment.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Agent file not found: {0}")]
    AgentFileNotFound(PathBuf),

    #[error("{name}() must return {} instance, got {actual}", with_article(.expected))]
    InvalidReturnType {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid app '{name}': {message}")]
    InvalidApp { name: String, message: String },

    #[error("requirements.txt not found at {0}\n   A requirements.txt file is required for deployment.\n   Create one with: pip freeze > requirements.txt")]
    RequirementsNotFound(PathBuf),

    #[error("No valid dependencies found in {0}\n   Please ensure your requirements.txt contains valid package specifications.")]
    NoDependencies(PathBuf),

    #[error("Authentication is enabled but no .env file found.\n   Create a .env file at {0} with AUTH_TOKEN=your-token\n   Or disable authentication.")]
    EnvFileMissing(PathBuf),

    #[error("Authentication is enabled but AUTH_TOKEN not found in {0}.\n   Add AUTH_TOKEN=your-secret-token to your .env file\n   Or disable authentication.")]
    AuthTokenMissing(PathBuf),

    #[error("Authentication is enabled but AUTH_TOKEN is commented out in {0}.\n   Uncomment the AUTH_TOKEN line in your .env file\n   Or disable authentication.")]
    AuthTokenCommentedOut(PathBuf),

    #[error("Authentication is enabled but AUTH_TOKEN is empty after loading the environment")]
    AuthTokenEmpty,

    #[error("Failed to load {path}: {message}")]
    EnvFile { path: PathBuf, message: String },

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn with_article(noun: &str) -> String {
    let article = match noun.chars().next() {
        Some(c) if "AEIOUaeiou".contains(c) => "an",
        _ => "a",
    };
    format!("{} {}", article, noun)
}
