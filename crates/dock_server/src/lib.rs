//! # dock_server
//!
//! HTTP surface for apps adapted by agentdock.
//!
//! This crate handles:
//! - Routes for REST and AG-UI apps (axum)
//! - Bearer-token authentication over every non-public path
//! - The OpenAPI document, with the bearer scheme when auth is on
//! - Dispatching runs to an [`AgentRuntime`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use dock_deploy::{prepare, DeployConfig};
//! use dock_server::{serve, AppState, AuthSettings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let deployment = prepare(&DeployConfig::new("agents/financial_agent.yaml"))?;
//! let state = AppState::new(deployment.app).with_auth(AuthSettings::new("secret", false));
//! serve(state, "127.0.0.1:8000".parse()?).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod runtime;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

pub use auth::{require_bearer, AuthFailure, AuthSettings};
pub use error::{ServerError, ServerResult};
pub use openapi::{openapi_document, route_table, RouteSpec, SECURITY_SCHEME};
pub use routes::{router, AguiMessage, AguiRunInput, AppState, RunResponse};
pub use runtime::{AgentRuntime, RunOutput, RunRequest, RunTarget, UnconfiguredRuntime};

/// Serve `state` on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> ServerResult<()> {
    let title = state.app().title();
    let entry_point = state.app().entry_point();
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr()?;

    info!("Serving '{}' from {} on http://{}", title, entry_point, local);
    info!("API docs at http://{}/docs", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
