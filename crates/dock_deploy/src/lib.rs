//! # dock_deploy
//!
//! Deployment preparation for agentdock.
//!
//! This crate handles:
//! - Deployment configuration (flags, `agentdock.yaml`, scaling from env)
//! - The `requirements.txt` dependency manifest
//! - `.env` secrets and auth token validation
//! - Adapting a resolved entry point into a servable app
//! - The deployment plan tying all stages together
//!
//! ## Example
//!
//! ```rust,no_run
//! use dock_deploy::{prepare, DeployConfig};
//!
//! let config = DeployConfig::new("agents/financial_agent.yaml").enable_auth(true);
//! let deployment = prepare(&config).unwrap();
//! println!("{}", deployment.plan);
//! ```

pub mod adapter;
pub mod config;
pub mod env_file;
pub mod error;
pub mod plan;
pub mod requirements;

pub use adapter::{DeploymentAdapter, ServableApp};
pub use config::{
    public_paths, DeployConfig, ScalingConfig, ALWAYS_PUBLIC_PATHS, CONFIG_FILE_NAME, DOC_PATHS,
};
pub use env_file::{
    auth_token_from, has_env_file, load_auth_token, load_env_file, validate_auth_configuration,
    AUTH_TOKEN_VAR,
};
pub use error::{DeployError, DeployResult};
pub use plan::{prepare, AuthSummary, Deployment, DeploymentPlan, EntryPointSummary};
pub use requirements::{baseline_packages, RequirementsManifest, SkipReason, SkippedLine};
