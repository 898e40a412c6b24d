//! Exported values of an agent module.

use std::fmt;
use std::sync::Arc;

use crate::error::ModuleResult;
use crate::models::{AppDefinition, AgentDefinition, TeamDefinition};

/// Zero-argument factory behind a function export.
pub type Factory = Arc<dyn Fn() -> ModuleResult<ExportValue> + Send + Sync>;

/// A callable export. What it returns is only known once it is invoked.
#[derive(Clone)]
pub struct FunctionExport {
    declared_in: String,
    factory: Factory,
}

impl FunctionExport {
    /// Create a function export declared in `declared_in`.
    pub fn new<F>(declared_in: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> ModuleResult<ExportValue> + Send + Sync + 'static,
    {
        Self {
            declared_in: declared_in.into(),
            factory: Arc::new(factory),
        }
    }

    /// Create a function export that always returns a clone of `value`.
    pub fn returning(declared_in: impl Into<String>, value: ExportValue) -> Self {
        Self::new(declared_in, move || Ok(value.clone()))
    }

    /// Module the function was defined in.
    pub fn declared_in(&self) -> &str {
        &self.declared_in
    }

    /// Call the function with no arguments.
    pub fn invoke(&self) -> ModuleResult<ExportValue> {
        (self.factory)()
    }
}

impl fmt::Debug for FunctionExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionExport")
            .field("declared_in", &self.declared_in)
            .finish_non_exhaustive()
    }
}

/// The value bound to an exported name.
#[derive(Debug, Clone)]
pub enum ExportValue {
    Function(FunctionExport),
    App(AppDefinition),
    Agent(AgentDefinition),
    Team(TeamDefinition),
    /// An imported type, e.g. `agno.agent.Agent`.
    Class { path: String },
    /// Any other plain value.
    Value(serde_yaml::Value),
}

impl ExportValue {
    /// Short type description used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            ExportValue::Function(_) => "function".to_string(),
            ExportValue::App(app) => app.protocol.app_type_name().to_string(),
            ExportValue::Agent(_) => "Agent".to_string(),
            ExportValue::Team(_) => "Team".to_string(),
            ExportValue::Class { path } => format!("class '{}'", path),
            ExportValue::Value(value) => match value {
                serde_yaml::Value::Null => "None".to_string(),
                serde_yaml::Value::Bool(_) => "bool".to_string(),
                serde_yaml::Value::Number(n) if n.is_f64() => "float".to_string(),
                serde_yaml::Value::Number(_) => "int".to_string(),
                serde_yaml::Value::String(_) => "str".to_string(),
                serde_yaml::Value::Sequence(_) => "list".to_string(),
                serde_yaml::Value::Mapping(_) => "dict".to_string(),
                serde_yaml::Value::Tagged(tagged) => tagged.tag.to_string(),
            },
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, ExportValue::Function(_))
    }
}

impl From<AgentDefinition> for ExportValue {
    fn from(agent: AgentDefinition) -> Self {
        ExportValue::Agent(agent)
    }
}

impl From<TeamDefinition> for ExportValue {
    fn from(team: TeamDefinition) -> Self {
        ExportValue::Team(team)
    }
}

impl From<AppDefinition> for ExportValue {
    fn from(app: AppDefinition) -> Self {
        ExportValue::App(app)
    }
}
