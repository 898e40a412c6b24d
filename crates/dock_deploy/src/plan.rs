//! Deployment plan.
//!
//! [`prepare`] runs every pre-deployment stage in order and returns the
//! adapted app together with a serializable summary of what would be
//! deployed.

use std::fmt;

use dock_module::Protocol;
use dock_resolver::{EntryPointResolver, PatternCategory};
use serde::Serialize;
use tracing::info;

use crate::adapter::{DeploymentAdapter, ServableApp};
use crate::config::{public_paths, DeployConfig, ScalingConfig};
use crate::env_file::{has_env_file, validate_auth_configuration};
use crate::error::DeployResult;
use crate::requirements::{RequirementsManifest, SkippedLine};

/// The resolved entry point as reported in a plan.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPointSummary {
    pub name: String,
    pub category: PatternCategory,
    pub expression: String,
}

/// Authentication settings as reported in a plan.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSummary {
    pub enabled: bool,
    pub protect_docs: bool,
    /// Paths reachable without a token; empty when auth is disabled
    pub public_paths: Vec<String>,
}

/// What a deployment would look like.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentPlan {
    pub app_name: String,
    pub module: String,
    pub protocol: Protocol,
    pub entry_point: EntryPointSummary,
    pub agents: Vec<String>,
    pub teams: Vec<String>,
    pub dependencies: Vec<String>,
    pub skipped_requirements: Vec<SkippedLine>,
    pub scaling: ScalingConfig,
    pub auth: AuthSummary,
    /// Whether `.env` will be injected as secrets
    pub inject_secrets: bool,
}

/// A plan together with the app it describes.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub plan: DeploymentPlan,
    pub app: ServableApp,
}

/// Validate configuration, secrets and dependencies, then resolve and adapt
/// the entry point.
pub fn prepare(config: &DeployConfig) -> DeployResult<Deployment> {
    config.validate()?;

    if config.auth_active() {
        validate_auth_configuration(&config.env_path())?;
    }

    let requirements = RequirementsManifest::load(config.requirements_path(), config.protocol)?;
    let inject_secrets = has_env_file(&config.env_path());

    let module = config.load_module()?;
    let resolution = EntryPointResolver::new(config.protocol).resolve(&module)?;
    let app = DeploymentAdapter::new(config.protocol).adapt(resolution)?;

    let plan = DeploymentPlan {
        app_name: config.app_name(),
        module: app.module.clone(),
        protocol: config.protocol,
        entry_point: EntryPointSummary {
            name: app.export_name.clone(),
            category: app.category,
            expression: app.entry_point(),
        },
        agents: app.app.agents.iter().map(|a| a.id()).collect(),
        teams: app.app.teams.iter().map(|t| t.id()).collect(),
        dependencies: requirements.packages,
        skipped_requirements: requirements.skipped,
        scaling: config.scaling,
        auth: AuthSummary {
            enabled: config.auth_active(),
            protect_docs: config.protect_docs,
            public_paths: if config.auth_active() {
                public_paths(config.protect_docs)
                    .into_iter()
                    .map(String::from)
                    .collect()
            } else {
                Vec::new()
            },
        },
        inject_secrets,
    };

    info!("Prepared deployment '{}' from {}", plan.app_name, plan.entry_point.expression);
    Ok(Deployment { plan, app })
}

impl fmt::Display for DeploymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "App name:     {}", self.app_name)?;
        writeln!(f, "Module:       {}", self.module)?;
        writeln!(f, "Protocol:     {}", self.protocol)?;
        writeln!(
            f,
            "Entry point:  {} ({})",
            self.entry_point.expression, self.entry_point.category
        )?;
        if !self.agents.is_empty() {
            writeln!(f, "Agents:       {}", self.agents.join(", "))?;
        }
        if !self.teams.is_empty() {
            writeln!(f, "Teams:        {}", self.teams.join(", "))?;
        }
        writeln!(f, "Dependencies ({}):", self.dependencies.len())?;
        for dep in &self.dependencies {
            writeln!(f, "  - {}", dep)?;
        }
        for skipped in &self.skipped_requirements {
            writeln!(f, "  ! line {} skipped: {}", skipped.line, skipped.content)?;
        }
        writeln!(
            f,
            "Scaling:      containers {}..{}, timeout {}s, {} concurrent inputs",
            self.scaling.min_containers,
            self.scaling.max_containers,
            self.scaling.timeout_seconds,
            self.scaling.max_concurrent
        )?;
        if self.auth.enabled {
            writeln!(
                f,
                "Auth:         bearer token (docs {})",
                if self.auth.protect_docs { "protected" } else { "public" }
            )?;
        } else {
            writeln!(f, "Auth:         disabled (public access)")?;
        }
        write!(
            f,
            "Secrets:      {}",
            if self.inject_secrets {
                "injected from .env"
            } else {
                "none (.env not found)"
            }
        )
    }
}
