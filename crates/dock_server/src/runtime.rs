//! Agent runtime seam.
//!
//! Running an agent (model calls, tools) happens behind [`AgentRuntime`].
//! The server only dispatches runs to it.

use async_trait::async_trait;
use dock_module::{AgentDefinition, TeamDefinition};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// What a run is executed against.
#[derive(Debug, Clone, PartialEq)]
pub enum RunTarget {
    Agent(AgentDefinition),
    Team(TeamDefinition),
}

impl RunTarget {
    pub fn id(&self) -> String {
        match self {
            RunTarget::Agent(agent) => agent.id(),
            RunTarget::Team(team) => team.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RunTarget::Agent(agent) => &agent.name,
            RunTarget::Team(team) => &team.name,
        }
    }
}

/// Body of a run request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl RunRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            user_id: None,
        }
    }
}

/// What a runtime produced for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Executes runs against agents and teams.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(&self, target: &RunTarget, request: &RunRequest) -> ServerResult<RunOutput>;
}

/// Runtime used when no agent backend is wired in. Every run fails with
/// 501 Not Implemented.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRuntime;

#[async_trait]
impl AgentRuntime for UnconfiguredRuntime {
    async fn run(&self, target: &RunTarget, _request: &RunRequest) -> ServerResult<RunOutput> {
        Err(ServerError::RuntimeUnavailable(format!(
            "no runtime is configured to execute '{}'",
            target.id()
        )))
    }
}
