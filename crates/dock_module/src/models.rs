//! Agent, team and app definitions.
//!
//! These are the values an agent module can bind to its exports. They carry
//! configuration only; running an agent is the job of a runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protocol an app is served with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// REST API app (FastAPI-style routes)
    #[default]
    Rest,
    /// AG-UI front-end protocol app
    Agui,
}

impl Protocol {
    /// Keyword an app factory name must contain for this protocol.
    pub fn app_keyword(&self) -> &'static str {
        match self {
            Protocol::Rest => "fastapi",
            Protocol::Agui => "agui",
        }
    }

    /// Canonical name of the app factory function.
    pub fn app_factory_name(&self) -> &'static str {
        match self {
            Protocol::Rest => "create_fastapi_app",
            Protocol::Agui => "create_agui_app",
        }
    }

    /// Display name of the app type served with this protocol.
    pub fn app_type_name(&self) -> &'static str {
        match self {
            Protocol::Rest => "FastAPIApp",
            Protocol::Agui => "AGUIApp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Rest => write!(f, "rest"),
            Protocol::Agui => write!(f, "agui"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rest" | "fastapi" => Ok(Protocol::Rest),
            "agui" | "ag-ui" => Ok(Protocol::Agui),
            other => Err(format!("unknown protocol '{}' (expected rest or agui)", other)),
        }
    }
}

/// Model binding of an agent, written either as `provider:id` or as a map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "ModelRepr")]
pub struct ModelSpec {
    pub provider: String,
    pub id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelRepr {
    Short(String),
    Full { provider: String, id: String },
}

impl From<ModelRepr> for ModelSpec {
    fn from(repr: ModelRepr) -> Self {
        match repr {
            ModelRepr::Short(s) => match s.split_once(':') {
                Some((provider, id)) => Self {
                    provider: provider.to_string(),
                    id: id.to_string(),
                },
                None => Self {
                    provider: "openai".to_string(),
                    id: s,
                },
            },
            ModelRepr::Full { provider, id } => Self { provider, id },
        }
    }
}

/// A toolkit attached to an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "ToolRepr")]
pub struct ToolSpec {
    pub name: String,
    pub options: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ToolRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        options: BTreeMap<String, serde_json::Value>,
    },
}

impl From<ToolRepr> for ToolSpec {
    fn from(repr: ToolRepr) -> Self {
        match repr {
            ToolRepr::Name(name) => Self {
                name,
                options: BTreeMap::new(),
            },
            ToolRepr::Full { name, options } => Self { name, options },
        }
    }
}

/// A configured conversational unit bound to a model and toolset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDefinition {
    pub name: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: Option<ModelSpec>,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub markdown: bool,
    #[serde(default)]
    pub add_history_to_messages: bool,
    #[serde(default)]
    pub num_history_responses: Option<u32>,
    #[serde(default)]
    pub add_datetime_to_instructions: bool,
    #[serde(default)]
    pub debug_mode: bool,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_id: None,
            description: None,
            model: None,
            tools: Vec::new(),
            instructions: Vec::new(),
            markdown: false,
            add_history_to_messages: false,
            num_history_responses: None,
            add_datetime_to_instructions: false,
            debug_mode: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.agent_id = Some(id.into());
        self
    }

    /// Identifier used on the HTTP surface.
    pub fn id(&self) -> String {
        self.agent_id.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// How a team distributes work among its members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamMode {
    Route,
    #[default]
    Coordinate,
    Collaborate,
}

/// A grouping of agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamDefinition {
    pub name: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mode: TeamMode,
    #[serde(default)]
    pub members: Vec<AgentDefinition>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl TeamDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team_id: None,
            description: None,
            mode: TeamMode::default(),
            members: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn member(mut self, agent: AgentDefinition) -> Self {
        self.members.push(agent);
        self
    }

    pub fn id(&self) -> String {
        self.team_id.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// A web-servable wrapper around agents and teams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppDefinition {
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
    #[serde(default)]
    pub teams: Vec<TeamDefinition>,
}

impl AppDefinition {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    /// Wrap a single agent into an app.
    pub fn for_agent(protocol: Protocol, agent: AgentDefinition) -> Self {
        Self::new(protocol).agent(agent)
    }

    /// Wrap a single team into an app.
    pub fn for_team(protocol: Protocol, team: TeamDefinition) -> Self {
        Self::new(protocol).team(team)
    }

    pub fn agent(mut self, agent: AgentDefinition) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn team(mut self, team: TeamDefinition) -> Self {
        self.teams.push(team);
        self
    }

    pub fn find_agent(&self, id: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn find_team(&self, id: &str) -> Option<&TeamDefinition> {
        self.teams.iter().find(|t| t.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.teams.is_empty()
    }
}

/// Lowercase a display name into a URL-safe identifier.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
