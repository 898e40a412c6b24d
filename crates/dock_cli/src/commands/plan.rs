//! Plan command - Print the deployment plan.

use anyhow::Result;
use clap::Args;
use tracing::info;

use dock_deploy::prepare;

use super::TargetArgs;

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: PlanArgs) -> Result<()> {
    let config = args.target.to_config()?;
    info!("Planning deployment of {}", config.agent_path().display());

    let deployment = prepare(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&deployment.plan)?);
    } else {
        println!("{}", deployment.plan);
    }
    Ok(())
}
