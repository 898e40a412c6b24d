//! Serve command - Serve the app over HTTP.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use dock_deploy::{load_auth_token, load_env_file, prepare, ScalingConfig};
use dock_server::{serve, AppState, AuthSettings};

use super::TargetArgs;

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Address to listen on
    #[arg(short, long, env = "AGENTDOCK_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.target.to_config()?;

    // .env may carry scaling values and the auth token
    load_env_file(&config.env_path())?;
    let config = config.scaling(ScalingConfig::from_env()?);

    let deployment = prepare(&config)?;
    let mut state = AppState::new(deployment.app);

    if config.auth_active() {
        let token = load_auth_token()?;
        state = state.with_auth(AuthSettings::new(token, config.protect_docs));
    } else {
        warn!("Serving without authentication");
    }

    serve(state, args.bind)
        .await
        .with_context(|| format!("Server on {} stopped with an error", args.bind))?;
    Ok(())
}
