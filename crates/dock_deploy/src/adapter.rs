//! Deployment adapter.
//!
//! Turns a resolved entry point into a servable app: factories are invoked
//! once, their result is type-checked against the resolved category, and
//! bare agents or teams are wrapped into an app of the deployed protocol.

use std::collections::HashSet;

use dock_module::{AppDefinition, ExportValue, Protocol};
use dock_resolver::{PatternCategory, Resolution};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{DeployError, DeployResult};

/// An adapted app plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ServableApp {
    pub app: AppDefinition,
    pub module: String,
    pub export_name: String,
    pub category: PatternCategory,
}

impl ServableApp {
    /// `module.name()` for factories, `module.name` for variables.
    pub fn entry_point(&self) -> String {
        if self.category.is_function() {
            format!("{}.{}()", self.module, self.export_name)
        } else {
            format!("{}.{}", self.module, self.export_name)
        }
    }

    /// Display name of the served app.
    pub fn title(&self) -> String {
        self.app
            .name
            .clone()
            .unwrap_or_else(|| self.module.rsplit('.').next().unwrap_or("app").to_string())
    }
}

/// Adapts resolved entry points into apps served with one protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentAdapter {
    protocol: Protocol,
}

impl DeploymentAdapter {
    pub fn new(protocol: Protocol) -> Self {
        Self { protocol }
    }

    /// Adapt `resolution` into a servable app.
    pub fn adapt(&self, resolution: Resolution) -> DeployResult<ServableApp> {
        let Resolution {
            module,
            category,
            name,
            value,
            ..
        } = resolution;

        let value = if category.is_function() {
            info!("Loading {} from {}.{}()", category.expected_type(self.protocol), module, name);
            match value {
                ExportValue::Function(func) => func.invoke()?,
                other => return Err(self.invalid_return(&name, category, &other)),
            }
        } else {
            info!("Loading {} from {}.{}", category.expected_type(self.protocol), module, name);
            value
        };

        let app = match (category, value) {
            (
                PatternCategory::AppFunction | PatternCategory::AppVariable,
                ExportValue::App(app),
            ) if app.protocol == self.protocol => app,
            (
                PatternCategory::AgentFunction | PatternCategory::AgentVariable,
                ExportValue::Agent(agent),
            ) => {
                debug!("Wrapping agent '{}' into an app", agent.name);
                AppDefinition::for_agent(self.protocol, agent)
            }
            (
                PatternCategory::TeamFunction | PatternCategory::TeamVariable,
                ExportValue::Team(team),
            ) => {
                debug!("Wrapping team '{}' into an app", team.name);
                AppDefinition::for_team(self.protocol, team)
            }
            (category, other) => return Err(self.invalid_return(&name, category, &other)),
        };

        self.check_app(&name, &app)?;

        Ok(ServableApp {
            app,
            module,
            export_name: name,
            category,
        })
    }

    fn invalid_return(
        &self,
        name: &str,
        category: PatternCategory,
        actual: &ExportValue,
    ) -> DeployError {
        DeployError::InvalidReturnType {
            name: name.to_string(),
            expected: category.expected_type(self.protocol).to_string(),
            actual: actual.type_name(),
        }
    }

    fn check_app(&self, name: &str, app: &AppDefinition) -> DeployResult<()> {
        let invalid = |message: String| DeployError::InvalidApp {
            name: name.to_string(),
            message,
        };

        if app.is_empty() {
            return Err(invalid("app serves no agents or teams".to_string()));
        }

        if self.protocol == Protocol::Agui && app.agents.len() + app.teams.len() != 1 {
            return Err(invalid(format!(
                "AG-UI apps serve exactly one agent or one team, found {} agents and {} teams",
                app.agents.len(),
                app.teams.len()
            )));
        }

        let mut seen = HashSet::new();
        for id in app.agents.iter().map(|a| a.id()) {
            if !seen.insert(id.clone()) {
                return Err(invalid(format!("duplicate agent id '{}'", id)));
            }
        }
        seen.clear();
        for id in app.teams.iter().map(|t| t.id()) {
            if !seen.insert(id.clone()) {
                return Err(invalid(format!("duplicate team id '{}'", id)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_module::{AgentDefinition, InMemoryModule, ModuleError, TeamDefinition};
    use dock_module::FunctionExport;
    use dock_resolver::EntryPointResolver;

    fn adapt(module: &InMemoryModule, protocol: Protocol) -> DeployResult<ServableApp> {
        let resolution = EntryPointResolver::new(protocol).resolve(module)?;
        DeploymentAdapter::new(protocol).adapt(resolution)
    }

    #[test]
    fn test_agent_function_is_invoked_and_wrapped() {
        let module = InMemoryModule::new("agents.financial")
            .function("create_agent", AgentDefinition::new("Financial Agent"));

        let servable = adapt(&module, Protocol::Rest).unwrap();
        assert_eq!(servable.app.protocol, Protocol::Rest);
        assert_eq!(servable.app.agents.len(), 1);
        assert_eq!(servable.entry_point(), "agents.financial.create_agent()");
    }

    #[test]
    fn test_team_variable_is_wrapped() {
        let team = TeamDefinition::new("Research").member(AgentDefinition::new("Searcher"));
        let module = InMemoryModule::new("agents.research").export("team", team);

        let servable = adapt(&module, Protocol::Agui).unwrap();
        assert_eq!(servable.app.protocol, Protocol::Agui);
        assert_eq!(servable.app.teams.len(), 1);
        assert_eq!(servable.entry_point(), "agents.research.team");
    }

    #[test]
    fn test_app_function_returning_agent_is_rejected() {
        let module = InMemoryModule::new("agents.bad")
            .function("create_fastapi_app", AgentDefinition::new("Oops"));

        let err = adapt(&module, Protocol::Rest).unwrap_err();
        match err {
            DeployError::InvalidReturnType {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "create_fastapi_app");
                assert_eq!(expected, "FastAPIApp");
                assert_eq!(actual, "Agent");
            }
            other => panic!("expected InvalidReturnType, got {:?}", other),
        }
    }

    #[test]
    fn test_app_function_returning_other_protocol_is_rejected() {
        let module = InMemoryModule::new("agents.bad").function(
            "create_fastapi_app",
            AppDefinition::for_agent(Protocol::Agui, AgentDefinition::new("A")),
        );

        let err = adapt(&module, Protocol::Rest).unwrap_err();
        assert!(err.to_string().contains("got AGUIApp"));
    }

    #[test]
    fn test_agent_function_returning_none_is_rejected() {
        let module = InMemoryModule::new("agents.bad").export(
            "create_agent",
            ExportValue::Function(FunctionExport::returning(
                "agents.bad",
                ExportValue::Value(serde_yaml::Value::Null),
            )),
        );

        let err = adapt(&module, Protocol::Rest).unwrap_err();
        assert_eq!(
            err.to_string(),
            "create_agent() must return an Agent instance, got None"
        );
    }

    #[test]
    fn test_factory_errors_propagate() {
        let module = InMemoryModule::new("agents.raising").export(
            "create_agent",
            ExportValue::Function(FunctionExport::new("agents.raising", || {
                Err(ModuleError::Invocation {
                    name: "create_agent".to_string(),
                    message: "missing OPENAI_API_KEY".to_string(),
                })
            })),
        );

        let err = adapt(&module, Protocol::Rest).unwrap_err();
        assert!(matches!(err, DeployError::Module(ModuleError::Invocation { .. })));
    }

    #[test]
    fn test_agui_app_must_hold_single_unit() {
        let app = AppDefinition::new(Protocol::Agui)
            .agent(AgentDefinition::new("A"))
            .agent(AgentDefinition::new("B"));
        let module = InMemoryModule::new("agents.multi").export("app", app);

        let err = adapt(&module, Protocol::Agui).unwrap_err();
        assert!(matches!(err, DeployError::InvalidApp { .. }));
    }

    #[test]
    fn test_empty_app_is_rejected() {
        let module =
            InMemoryModule::new("agents.empty").export("app", AppDefinition::new(Protocol::Rest));
        let err = adapt(&module, Protocol::Rest).unwrap_err();
        assert!(err.to_string().contains("no agents or teams"));
    }

    #[test]
    fn test_duplicate_agent_ids_are_rejected() {
        let app = AppDefinition::new(Protocol::Rest)
            .agent(AgentDefinition::new("Analyst"))
            .agent(AgentDefinition::new("analyst"));
        let module = InMemoryModule::new("agents.dup").export("app", app);

        let err = adapt(&module, Protocol::Rest).unwrap_err();
        assert!(err.to_string().contains("duplicate agent id 'analyst'"));
    }
}
