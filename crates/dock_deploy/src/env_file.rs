//! Secrets file (`.env`) handling.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{DeployError, DeployResult};

/// Variable holding the bearer token.
pub const AUTH_TOKEN_VAR: &str = "AUTH_TOKEN";

/// Check that `.env` is ready for an authenticated deployment.
///
/// The file must exist, mention `AUTH_TOKEN=`, and carry at least one line
/// where it is not commented out.
pub fn validate_auth_configuration(env_path: &Path) -> DeployResult<()> {
    if !env_path.is_file() {
        return Err(DeployError::EnvFileMissing(env_path.to_path_buf()));
    }

    let content = fs::read_to_string(env_path)?;
    let assignment = format!("{}=", AUTH_TOKEN_VAR);
    if !content.contains(&assignment) {
        return Err(DeployError::AuthTokenMissing(env_path.to_path_buf()));
    }

    let active = content.lines().map(str::trim).any(|line| {
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        line.starts_with(&assignment)
    });
    if !active {
        return Err(DeployError::AuthTokenCommentedOut(env_path.to_path_buf()));
    }

    info!("Authentication configuration validated");
    Ok(())
}

/// Whether secrets will be injected from `.env`.
pub fn has_env_file(env_path: &Path) -> bool {
    if env_path.is_file() {
        info!("Found .env file at {}", env_path.display());
        true
    } else {
        warn!(
            "No .env file found at {}; the agent may not work without API keys",
            env_path.display()
        );
        false
    }
}

/// Load `.env` into the process environment if it exists.
///
/// Variables already set in the environment win.
pub fn load_env_file(env_path: &Path) -> DeployResult<bool> {
    if !has_env_file(env_path) {
        return Ok(false);
    }
    dotenv::from_path(env_path).map_err(|e| DeployError::EnvFile {
        path: env_path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(true)
}

/// Read the bearer token from the process environment.
pub fn load_auth_token() -> DeployResult<String> {
    auth_token_from(|key| std::env::var(key).ok())
}

/// Read the bearer token through `lookup`. Empty tokens are rejected.
pub fn auth_token_from<F>(lookup: F) -> DeployResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(AUTH_TOKEN_VAR) {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(DeployError::AuthTokenEmpty),
    }
}
