//! Integration tests for entry-point resolution over module files.

use std::fs;
use std::path::{Path, PathBuf};

use dock_module::{
    AgentDefinition, AgentModule, AppDefinition, ExportValue, InMemoryModule, ModuleReader,
    ModuleResult, Protocol,
};
use dock_resolver::{EntryPointResolver, PatternCategory, ResolveError};
use tempfile::tempdir;

fn demo_project() -> PathBuf {
    let candidates = [
        "demos/financial",
        "../demos/financial",
        "../../demos/financial",
    ];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return PathBuf::from(candidate);
        }
    }

    PathBuf::from("demos/financial")
}

fn resolve_demo(file: &str, protocol: Protocol) -> Result<dock_resolver::Resolution, ResolveError> {
    let root = demo_project();
    let module = ModuleReader::read(root.join("agents").join(file), &root).unwrap();
    EntryPointResolver::new(protocol).resolve(&module)
}

/// Wraps a module and reports its names in reverse order.
struct Reversed(InMemoryModule);

impl AgentModule for Reversed {
    fn path(&self) -> &str {
        self.0.path()
    }

    fn explicit_exports(&self) -> Option<&[String]> {
        self.0.explicit_exports()
    }

    fn export_names(&self) -> Vec<String> {
        let mut names = self.0.export_names();
        names.reverse();
        names
    }

    fn get(&self, name: &str) -> ModuleResult<ExportValue> {
        self.0.get(name)
    }
}

#[test]
fn test_demo_multi_agent_app_function() {
    let resolution = resolve_demo("multi_agent_app_function_fastapi.yaml", Protocol::Rest).unwrap();
    assert_eq!(resolution.name, "create_fastapi_app");
    assert_eq!(resolution.category, PatternCategory::AppFunction);
    assert_eq!(resolution.module, "agents.multi_agent_app_function_fastapi");
    assert_eq!(
        resolution
            .discovery
            .candidates(PatternCategory::AgentFunction)
            .len(),
        2
    );
}

#[test]
fn test_demo_multiple_patterns_uses_explicit_list() {
    let resolution =
        resolve_demo("financial_agent_app_multiple_patterns.yaml", Protocol::Rest).unwrap();
    assert_eq!(resolution.name, "create_agent");
    assert_eq!(resolution.category, PatternCategory::AgentFunction);
    assert!(resolution.discovery.explicit);
}

#[test]
fn test_demo_variable_patterns() {
    let app = resolve_demo("financial_agent_app_variable_fastapi.yaml", Protocol::Rest).unwrap();
    assert_eq!(app.category, PatternCategory::AppVariable);

    let agent = resolve_demo("financial_agent_app_variable_agent.yaml", Protocol::Rest).unwrap();
    assert_eq!(agent.category, PatternCategory::AgentVariable);
    assert_eq!(agent.name, "agent");
}

#[test]
fn test_demo_team_function() {
    let resolution = resolve_demo("research_team.yaml", Protocol::Rest).unwrap();
    assert_eq!(resolution.category, PatternCategory::TeamFunction);
    assert_eq!(resolution.name, "create_research_team");
}

#[test]
fn test_demo_agui_app() {
    let resolution = resolve_demo("financial_agent_agui_app.yaml", Protocol::Agui).unwrap();
    assert_eq!(resolution.name, "create_agui_app");
    assert_eq!(resolution.category, PatternCategory::AppFunction);

    // Served as REST, the AG-UI factory is not an app factory.
    let rest = resolve_demo("financial_agent_agui_app.yaml", Protocol::Rest).unwrap();
    assert_eq!(rest.name, "create_financial_agent");
    assert_eq!(rest.category, PatternCategory::AgentFunction);
}

#[test]
fn test_resolution_independent_of_enumeration_order() {
    let build = || {
        InMemoryModule::new("agents.order")
            .function("create_agent", AgentDefinition::new("A"))
            .export("zeta_agent", AgentDefinition::new("Z"))
            .export("alpha_app", AppDefinition::for_agent(Protocol::Rest, AgentDefinition::new("B")))
    };

    let resolver = EntryPointResolver::default();
    let forward = resolver.resolve(&build()).unwrap();
    let backward = resolver.resolve(&Reversed(build())).unwrap();

    assert_eq!(forward.name, "create_agent");
    assert_eq!(forward.name, backward.name);
    assert_eq!(forward.category, backward.category);
}

#[test]
fn test_ambiguity_message_independent_of_enumeration_order() {
    let build = || {
        InMemoryModule::new("agents.order")
            .export("first", AgentDefinition::new("A"))
            .export("second", AgentDefinition::new("B"))
    };

    let resolver = EntryPointResolver::default();
    let forward = resolver.resolve(&build()).unwrap_err().to_string();
    let backward = resolver.resolve(&Reversed(build())).unwrap_err().to_string();
    assert_eq!(forward, backward);
    assert!(forward.contains("first, second"));
}

#[test]
fn test_reexported_function_in_module_file() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("shop.yaml");
    fs::write(
        &file,
        r#"
exports:
  create_agent:
    function:
      declared_in: agno.shared.factories
      returns:
        agent: { name: Imported }
  shop_agent:
    agent: { name: Shop Assistant }
"#,
    )
    .unwrap();

    let module = ModuleReader::read(&file, temp.path()).unwrap();
    let resolution = EntryPointResolver::default().resolve(&module).unwrap();
    assert_eq!(resolution.name, "shop_agent");
    assert_eq!(resolution.category, PatternCategory::AgentVariable);
}

#[test]
fn test_explicit_list_excludes_matching_export() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("pick.yaml");
    fs::write(
        &file,
        r#"
all: [support_team]
exports:
  create_fastapi_app:
    function:
      returns:
        app: { agents: [{ name: Support }] }
  support_team:
    team: { name: Support Team, members: [{ name: Support }] }
"#,
    )
    .unwrap();

    let module = ModuleReader::read(&file, temp.path()).unwrap();
    let resolution = EntryPointResolver::default().resolve(&module).unwrap();
    assert_eq!(resolution.name, "support_team");
    assert!(resolution
        .discovery
        .candidates(PatternCategory::AppFunction)
        .is_empty());
}

#[test]
fn test_malformed_export_is_skipped() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("broken.yaml");
    fs::write(
        &file,
        r#"
exports:
  create_fastapi_app:
    function:
      returns: { app: {} }
      unexpected: true
  agent:
    agent: { name: Fallback }
"#,
    )
    .unwrap();

    let module = ModuleReader::read(&file, temp.path()).unwrap();
    let resolution = EntryPointResolver::default().resolve(&module).unwrap();
    assert_eq!(resolution.name, "agent");
    assert_eq!(resolution.discovery.skipped.len(), 1);
    assert_eq!(resolution.discovery.skipped[0].name, "create_fastapi_app");
}
