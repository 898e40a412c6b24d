//! Pattern categories and their fixed priority order.

use std::fmt;

use dock_module::Protocol;
use serde::Serialize;

/// The shapes an entry point may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    AppFunction,
    AgentFunction,
    TeamFunction,
    AppVariable,
    AgentVariable,
    TeamVariable,
}

/// Categories from highest to lowest priority.
pub const PRIORITY: [PatternCategory; 6] = [
    PatternCategory::AppFunction,
    PatternCategory::AgentFunction,
    PatternCategory::TeamFunction,
    PatternCategory::AppVariable,
    PatternCategory::AgentVariable,
    PatternCategory::TeamVariable,
];

impl PatternCategory {
    /// Priority rank, lower wins.
    pub fn rank(&self) -> usize {
        PRIORITY
            .iter()
            .position(|c| c == self)
            .unwrap_or(PRIORITY.len())
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            PatternCategory::AppFunction
                | PatternCategory::AgentFunction
                | PatternCategory::TeamFunction
        )
    }

    /// Type the entry point must be (or return).
    pub fn expected_type(&self, protocol: Protocol) -> &'static str {
        match self {
            PatternCategory::AppFunction | PatternCategory::AppVariable => {
                protocol.app_type_name()
            }
            PatternCategory::AgentFunction | PatternCategory::AgentVariable => "Agent",
            PatternCategory::TeamFunction | PatternCategory::TeamVariable => "Team",
        }
    }

    /// Human label, e.g. "FastAPIApp function".
    pub fn label(&self, protocol: Protocol) -> String {
        let kind = if self.is_function() { "function" } else { "variable" };
        format!("{} {}", self.expected_type(protocol), kind)
    }

    /// Example declaration of this shape.
    pub fn example(&self, protocol: Protocol) -> String {
        match self {
            PatternCategory::AppFunction => format!(
                "Function returning {} (e.g., {}: {{ function: {{ returns: {{ app: ... }} }} }})",
                protocol.app_type_name(),
                protocol.app_factory_name()
            ),
            PatternCategory::AgentFunction => {
                "Function returning Agent (e.g., create_agent: { function: { returns: { agent: ... } } })"
                    .to_string()
            }
            PatternCategory::TeamFunction => {
                "Function returning Team (e.g., create_team: { function: { returns: { team: ... } } })"
                    .to_string()
            }
            PatternCategory::AppVariable => format!(
                "Direct {} variable (e.g., app: {{ app: {{ protocol: {}, agents: [...] }} }})",
                protocol.app_type_name(),
                protocol
            ),
            PatternCategory::AgentVariable => {
                "Direct Agent variable (e.g., agent: { agent: { name: ... } })".to_string()
            }
            PatternCategory::TeamVariable => {
                "Direct Team variable (e.g., team: { team: { name: ..., members: [...] } })"
                    .to_string()
            }
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternCategory::AppFunction => "app_function",
            PatternCategory::AgentFunction => "agent_function",
            PatternCategory::TeamFunction => "team_function",
            PatternCategory::AppVariable => "app_variable",
            PatternCategory::AgentVariable => "agent_variable",
            PatternCategory::TeamVariable => "team_variable",
        };
        write!(f, "{}", s)
    }
}

/// Numbered list of every recognised shape.
pub fn supported_patterns(protocol: &Protocol) -> String {
    PRIORITY
        .iter()
        .enumerate()
        .map(|(i, c)| format!("   {}. {}", i + 1, c.example(*protocol)))
        .collect::<Vec<_>>()
        .join("\n")
}
