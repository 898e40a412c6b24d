//! CLI command definitions.
//!
//! This module defines the command structure for the agentdock CLI.
//! Each subcommand maps to one stage of preparing or serving an agent app.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

use dock_deploy::{DeployConfig, DeployError, ScalingConfig, CONFIG_FILE_NAME};
use dock_module::Protocol;

pub mod check;
pub mod inspect;
pub mod list;
pub mod plan;
pub mod requirements;
pub mod serve;

/// agentdock - deploy agent modules as REST or AG-UI apps
#[derive(Parser)]
#[command(name = "agentdock")]
#[command(version, about = "agentdock - deploy agent modules as REST or AG-UI apps")]
#[command(long_about = r#"
agentdock finds the deployable entry point of an agent module, validates
dependencies and secrets, and serves the result as a REST or AG-UI app.

COMMANDS:
  inspect       → Show how a module's exports were classified
  list          → Resolve every module file below a directory
  requirements  → Show the dependency manifest that would be installed
  plan          → Print the deployment plan (text or JSON)
  check         → Run every pre-deployment check
  serve         → Serve the app over HTTP

Without an agent file, <root>/agentdock.yaml is used when present.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Entry point resolution failure
  4 - Invalid return type
  5 - Dependency manifest error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a module's exports were classified
    Inspect(inspect::InspectArgs),

    /// Resolve every module file below a directory
    List(list::ListArgs),

    /// Show the dependency manifest that would be installed
    Requirements(requirements::RequirementsArgs),

    /// Print the deployment plan
    Plan(plan::PlanArgs),

    /// Run every pre-deployment check
    Check(check::CheckArgs),

    /// Serve the app over HTTP
    Serve(serve::ServeArgs),
}

/// Which app to work on and how it is deployed.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Agent module file, relative to the project root
    #[arg(env = "AGENT_FILE")]
    pub agent_file: Option<PathBuf>,

    /// Deployment config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root holding requirements.txt and .env
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Protocol the app is served with (rest or agui)
    #[arg(short, long, env = "AGENTDOCK_PROTOCOL")]
    pub protocol: Option<Protocol>,

    /// Require a bearer token (AUTH_TOKEN from .env)
    #[arg(long, env = "ENABLE_AUTH", value_parser = BoolishValueParser::new())]
    pub enable_auth: bool,

    /// Also require the token for /docs and /redoc
    #[arg(long, env = "PROTECT_DOCS", value_parser = BoolishValueParser::new())]
    pub protect_docs: bool,
}

impl TargetArgs {
    /// Build the deployment configuration. Flags override the config file;
    /// scaling always comes from the environment.
    pub fn to_config(&self) -> Result<DeployConfig> {
        let config_file = self.config.clone().or_else(|| {
            let default = self.root.join(CONFIG_FILE_NAME);
            (self.agent_file.is_none() && default.is_file()).then_some(default)
        });

        let mut config = match (config_file, &self.agent_file) {
            (Some(path), agent_file) => {
                let mut config = DeployConfig::from_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                if let Some(file) = agent_file {
                    config.agent_file = file.clone();
                }
                config
            }
            (None, Some(file)) => DeployConfig::new(file).project_root(&self.root),
            (None, None) => {
                return Err(DeployError::Configuration(format!(
                    "no agent file given and no {} in {}",
                    CONFIG_FILE_NAME,
                    self.root.display()
                ))
                .into())
            }
        };

        if let Some(protocol) = self.protocol {
            config = config.protocol(protocol);
        }
        if self.enable_auth {
            config = config.enable_auth(true);
        }
        if self.protect_docs {
            config = config.protect_docs(true);
        }

        Ok(config.scaling(ScalingConfig::from_env()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["agentdock"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn target(cli: Cli) -> TargetArgs {
        match cli.command {
            Commands::Plan(args) => args.target,
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn test_parse_plan_flags() {
        let cli = parse(&[
            "plan",
            "agents/research_team.yaml",
            "--protocol",
            "agui",
            "--enable-auth",
            "--json",
            "-v",
        ]);
        assert!(cli.verbose);
        let args = target(cli);
        assert_eq!(args.agent_file, Some(PathBuf::from("agents/research_team.yaml")));
        assert_eq!(args.protocol, Some(Protocol::Agui));
        assert!(args.enable_auth);
        assert!(!args.protect_docs);
    }

    #[test]
    fn test_auth_switch_from_environment() {
        let cases = [
            ("True", true),
            ("1", true),
            ("yes", true),
            ("0", false),
            ("False", false),
        ];
        for (value, expected) in cases {
            std::env::set_var("ENABLE_AUTH", value);
            let args = target(parse(&["plan", "a.yaml"]));
            assert_eq!(args.enable_auth, expected, "ENABLE_AUTH={}", value);
        }
        std::env::remove_var("ENABLE_AUTH");
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let result = Cli::try_parse_from(["agentdock", "plan", "a.yaml", "--protocol", "grpc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "agent_file: agents/app.yaml\nprotocol: rest\nenable_auth: false\n",
        )
        .unwrap();

        let args = TargetArgs {
            agent_file: None,
            config: None,
            root: dir.path().to_path_buf(),
            protocol: Some(Protocol::Agui),
            enable_auth: true,
            protect_docs: false,
        };
        let config = args.to_config().unwrap();

        assert_eq!(config.agent_file, PathBuf::from("agents/app.yaml"));
        assert_eq!(config.project_root, dir.path());
        assert_eq!(config.protocol, Protocol::Agui);
        assert!(config.enable_auth);
        assert_eq!(config.app_name(), "app_agui");
    }

    #[test]
    fn test_agent_file_without_config() {
        let dir = tempdir().unwrap();
        let args = TargetArgs {
            agent_file: Some(PathBuf::from("agents/solo.yaml")),
            config: None,
            root: dir.path().to_path_buf(),
            protocol: None,
            enable_auth: false,
            protect_docs: true,
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.agent_path(), dir.path().join("agents/solo.yaml"));
        assert_eq!(config.protocol, Protocol::Rest);
        assert!(config.protect_docs);
    }

    #[test]
    fn test_missing_target_is_configuration_error() {
        let dir = tempdir().unwrap();
        let args = TargetArgs {
            agent_file: None,
            config: None,
            root: dir.path().to_path_buf(),
            protocol: None,
            enable_auth: false,
            protect_docs: false,
        };
        let err = args.to_config().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::Configuration(_))
        ));
    }
}
