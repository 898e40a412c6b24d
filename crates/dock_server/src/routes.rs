//! Router and request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use dock_deploy::ServableApp;
use dock_module::{AgentDefinition, Protocol, TeamDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::auth::{require_bearer, AuthSettings};
use crate::error::{ServerError, ServerResult};
use crate::openapi::{openapi_document, redoc_html, swagger_ui_html};
use crate::runtime::{AgentRuntime, RunRequest, RunTarget, UnconfiguredRuntime};

/// Shared, immutable server state.
#[derive(Clone)]
pub struct AppState {
    app: Arc<ServableApp>,
    runtime: Arc<dyn AgentRuntime>,
    auth: Option<Arc<AuthSettings>>,
    openapi: Arc<Value>,
}

impl AppState {
    /// State for `app` with no runtime and no authentication.
    pub fn new(app: ServableApp) -> Self {
        let openapi = openapi_document(&app, None);
        Self {
            app: Arc::new(app),
            runtime: Arc::new(UnconfiguredRuntime),
            auth: None,
            openapi: Arc::new(openapi),
        }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn AgentRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Guard the app with a bearer token. Ignored for AG-UI apps.
    pub fn with_auth(mut self, settings: AuthSettings) -> Self {
        if self.app.app.protocol == Protocol::Agui {
            warn!("Authentication is not supported for AG-UI apps; serving without it");
            return self;
        }
        self.openapi = Arc::new(openapi_document(&self.app, Some(&settings)));
        self.auth = Some(Arc::new(settings));
        self
    }

    pub fn app(&self) -> &ServableApp {
        &self.app
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }
}

/// Build the router for the app's protocol.
pub fn router(state: AppState) -> Router {
    let common = Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs))
        .route("/redoc", get(redoc));

    let routes = match state.app.app.protocol {
        Protocol::Rest => common
            .route("/v1/agents", get(list_agents))
            .route("/v1/agents/{agent_id}", get(get_agent))
            .route("/v1/agents/{agent_id}/runs", post(run_agent))
            .route("/v1/teams", get(list_teams))
            .route("/v1/teams/{team_id}", get(get_team))
            .route("/v1/teams/{team_id}/runs", post(run_team)),
        Protocol::Agui => common.route("/agui", post(run_agui)),
    };

    let mut router = routes.fallback(not_found).with_state(state.clone());
    if let Some(settings) = state.auth {
        info!("Adding authentication middleware");
        router = router.layer(middleware::from_fn_with_state(settings, require_bearer));
    }
    router.layer(middleware::from_fn(trace_requests))
}

/// Wrap each request in a span carrying a request id.
async fn trace_requests(request: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(request).await;
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "handled"
        );
        response
    }
    .instrument(span)
    .await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "available",
        "app": state.app.title(),
        "protocol": state.app.app.protocol,
        "entry_point": state.app.entry_point(),
        "agents": state.app.app.agents.len(),
        "teams": state.app.app.teams.len(),
        "auth": state.auth_enabled(),
    }))
}

async fn openapi_json(State(state): State<AppState>) -> Json<Value> {
    Json(state.openapi.as_ref().clone())
}

async fn docs(State(state): State<AppState>) -> Html<String> {
    Html(swagger_ui_html(&state.app.title()))
}

async fn redoc(State(state): State<AppState>) -> Html<String> {
    Html(redoc_html(&state.app.title()))
}

async fn not_found(request: Request) -> ServerError {
    ServerError::NotFound(request.uri().path().to_string())
}

#[derive(Debug, Serialize)]
struct AgentSummary<'a> {
    agent_id: String,
    name: &'a str,
    description: Option<&'a str>,
    model: Option<String>,
    tools: Vec<&'a str>,
}

impl<'a> From<&'a AgentDefinition> for AgentSummary<'a> {
    fn from(agent: &'a AgentDefinition) -> Self {
        Self {
            agent_id: agent.id(),
            name: &agent.name,
            description: agent.description.as_deref(),
            model: agent
                .model
                .as_ref()
                .map(|m| format!("{}:{}", m.provider, m.id)),
            tools: agent.tools.iter().map(|t| t.name.as_str()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TeamSummary<'a> {
    team_id: String,
    name: &'a str,
    description: Option<&'a str>,
    mode: dock_module::TeamMode,
    members: Vec<AgentSummary<'a>>,
}

impl<'a> From<&'a TeamDefinition> for TeamSummary<'a> {
    fn from(team: &'a TeamDefinition) -> Self {
        Self {
            team_id: team.id(),
            name: &team.name,
            description: team.description.as_deref(),
            mode: team.mode,
            members: team.members.iter().map(AgentSummary::from).collect(),
        }
    }
}

async fn list_agents(State(state): State<AppState>) -> Json<Value> {
    let agents: Vec<AgentSummary> = state.app.app.agents.iter().map(AgentSummary::from).collect();
    Json(json!(agents))
}

async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ServerResult<Json<Value>> {
    let agent = state
        .app
        .app
        .find_agent(&agent_id)
        .ok_or(ServerError::AgentNotFound(agent_id))?;
    Ok(Json(json!({
        "agent_id": agent.id(),
        "definition": agent,
    })))
}

async fn list_teams(State(state): State<AppState>) -> Json<Value> {
    let teams: Vec<TeamSummary> = state.app.app.teams.iter().map(TeamSummary::from).collect();
    Json(json!(teams))
}

async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ServerResult<Json<Value>> {
    let team = state
        .app
        .app
        .find_team(&team_id)
        .ok_or(ServerError::TeamNotFound(team_id))?;
    Ok(Json(json!({
        "team_id": team.id(),
        "definition": team,
    })))
}

/// Response body of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_id: String,
    pub session_id: String,
    pub target_id: String,
    pub content: String,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

async fn dispatch(state: &AppState, target: RunTarget, request: RunRequest) -> ServerResult<RunResponse> {
    if request.message.trim().is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".to_string()));
    }

    let run_id = Uuid::new_v4().to_string();
    info!("Starting run {} on '{}'", run_id, target.id());
    let output = state.runtime.run(&target, &request).await?;

    Ok(RunResponse {
        run_id,
        session_id: request
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        target_id: target.id(),
        content: output.content,
        model: output.model,
        created_at: Utc::now(),
    })
}

async fn run_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(request): Json<RunRequest>,
) -> ServerResult<Json<RunResponse>> {
    let agent = state
        .app
        .app
        .find_agent(&agent_id)
        .cloned()
        .ok_or(ServerError::AgentNotFound(agent_id))?;
    Ok(Json(dispatch(&state, RunTarget::Agent(agent), request).await?))
}

async fn run_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<RunRequest>,
) -> ServerResult<Json<RunResponse>> {
    let team = state
        .app
        .app
        .find_team(&team_id)
        .cloned()
        .ok_or(ServerError::TeamNotFound(team_id))?;
    Ok(Json(dispatch(&state, RunTarget::Team(team), request).await?))
}

/// A message in an AG-UI run input.
#[derive(Debug, Clone, Deserialize)]
pub struct AguiMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// AG-UI run input, reduced to the fields the server uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AguiRunInput {
    pub thread_id: String,
    pub run_id: String,
    #[serde(default)]
    pub messages: Vec<AguiMessage>,
}

async fn run_agui(
    State(state): State<AppState>,
    Json(input): Json<AguiRunInput>,
) -> ServerResult<Response> {
    let target = match (state.app.app.agents.first(), state.app.app.teams.first()) {
        (Some(agent), _) => RunTarget::Agent(agent.clone()),
        (None, Some(team)) => RunTarget::Team(team.clone()),
        (None, None) => return Err(ServerError::NotFound("/agui".to_string())),
    };

    let message = input
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .ok_or_else(|| ServerError::InvalidRequest("no user message in run input".to_string()))?;

    let request = RunRequest {
        message,
        session_id: Some(input.thread_id.clone()),
        user_id: None,
    };
    let output = state.runtime.run(&target, &request).await?;

    let message_id = Uuid::new_v4().to_string();
    let events = [
        json!({ "type": "RUN_STARTED", "threadId": input.thread_id, "runId": input.run_id }),
        json!({ "type": "TEXT_MESSAGE_START", "messageId": message_id, "role": "assistant" }),
        json!({ "type": "TEXT_MESSAGE_CONTENT", "messageId": message_id, "delta": output.content }),
        json!({ "type": "TEXT_MESSAGE_END", "messageId": message_id }),
        json!({ "type": "RUN_FINISHED", "threadId": input.thread_id, "runId": input.run_id }),
    ];
    let body: String = events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect();

    Ok(([(CONTENT_TYPE, "text/event-stream")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dock_module::AppDefinition;
    use dock_resolver::PatternCategory;

    use crate::runtime::RunOutput;

    struct EchoRuntime;

    #[async_trait]
    impl AgentRuntime for EchoRuntime {
        async fn run(&self, target: &RunTarget, request: &RunRequest) -> ServerResult<RunOutput> {
            Ok(RunOutput {
                content: format!("{}: {}", target.name(), request.message),
                model: None,
            })
        }
    }

    fn state() -> AppState {
        let app = AppDefinition::for_agent(Protocol::Rest, AgentDefinition::new("Echo"));
        AppState::new(ServableApp {
            app,
            module: "agents.echo".to_string(),
            export_name: "agent".to_string(),
            category: PatternCategory::AgentVariable,
        })
        .with_runtime(Arc::new(EchoRuntime))
    }

    #[tokio::test]
    async fn test_dispatch_fills_run_metadata() {
        let state = state();
        let agent = state.app().app.agents[0].clone();
        let mut request = RunRequest::new("hi");
        request.session_id = Some("session-1".to_string());

        let response = dispatch(&state, RunTarget::Agent(agent), request)
            .await
            .unwrap();
        assert_eq!(response.content, "Echo: hi");
        assert_eq!(response.session_id, "session-1");
        assert_eq!(response.target_id, "echo");
        assert!(Uuid::parse_str(&response.run_id).is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_rejects_empty_message() {
        let state = state();
        let agent = state.app().app.agents[0].clone();
        let err = dispatch(&state, RunTarget::Agent(agent), RunRequest::new("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }

    #[test]
    fn test_auth_ignored_for_agui() {
        let app = AppDefinition::for_agent(Protocol::Agui, AgentDefinition::new("Echo"));
        let state = AppState::new(ServableApp {
            app,
            module: "agents.echo".to_string(),
            export_name: "agent".to_string(),
            category: PatternCategory::AgentVariable,
        })
        .with_auth(AuthSettings::new("secret", true));
        assert!(!state.auth_enabled());
    }
}
