//! Check command - Run every pre-deployment check.
//!
//! Unlike `plan`, each check runs even when an earlier one fails, so a
//! single invocation reports everything that needs fixing.

use anyhow::{Error, Result};
use clap::Args;

use dock_deploy::{
    has_env_file, validate_auth_configuration, DeployConfig, DeploymentAdapter,
    RequirementsManifest,
};
use dock_resolver::EntryPointResolver;

use super::TargetArgs;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn execute(args: CheckArgs) -> Result<()> {
    let config = args.target.to_config()?;
    let mut first_error: Option<Error> = None;
    let mut record = |result: Result<String>, label: &str| match result {
        Ok(detail) => println!("   ✅ {}: {}", label, detail),
        Err(e) => {
            println!("   ❌ {}: {:#}", label, e);
            first_error.get_or_insert(e);
        }
    };

    println!("⚙️  Checking deployment of {}", config.agent_path().display());

    let validation = config.validate();
    let config_ok = validation.is_ok();
    record(
        validation.map(|_| config.app_name()).map_err(Into::into),
        "Configuration",
    );

    if config.auth_active() {
        record(
            validate_auth_configuration(&config.env_path())
                .map(|_| "AUTH_TOKEN configured".to_string())
                .map_err(Into::into),
            "Authentication",
        );
    } else {
        println!("   ⏭️  Authentication: disabled");
    }

    if !has_env_file(&config.env_path()) {
        println!("   ⚠️  Secrets: no .env file, the agent may lack API keys");
    }

    record(
        RequirementsManifest::load(config.requirements_path(), config.protocol)
            .map(|m| format!("{} package(s)", m.packages.len()))
            .map_err(Into::into),
        "Dependencies",
    );

    if config_ok {
        record(check_entry_point(&config), "Entry point");
    }

    match first_error {
        None => {
            println!("\n✅ Ready to deploy");
            Ok(())
        }
        Some(e) => {
            println!("\n❌ Deployment checks failed");
            Err(e)
        }
    }
}

fn check_entry_point(config: &DeployConfig) -> Result<String> {
    let module = config.load_module()?;
    let resolution = EntryPointResolver::new(config.protocol).resolve(&module)?;
    let app = DeploymentAdapter::new(config.protocol).adapt(resolution)?;
    Ok(format!(
        "{} ({}, {} agent(s), {} team(s))",
        app.entry_point(),
        app.category,
        app.app.agents.len(),
        app.app.teams.len()
    ))
}
