//! Entry-point resolver.
//!
//! The resolver handles:
//! - Candidate discovery (explicit export list or all public names)
//! - Classification of each export into a pattern category
//! - Priority-based selection with ambiguity detection

use std::collections::{BTreeMap, HashSet};

use dock_module::{AgentModule, ExportValue, Protocol};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::category::{PatternCategory, PRIORITY};
use crate::error::{ResolveError, ResolveResult};
use crate::rules::{classify, Classification, ExportShape, MatchContext};

/// An export that matched a category.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub category: PatternCategory,
    pub value: ExportValue,
    /// Other categories the name matched equally well.
    pub overlapping: Vec<PatternCategory>,
}

/// An export that could not be inspected.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedExport {
    pub name: String,
    pub reason: String,
}

/// Everything found while scanning a module.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    /// Whether the module's explicit export list drove discovery.
    pub explicit: bool,
    /// Names that were inspected.
    pub considered: Vec<String>,
    /// Names whose access failed.
    pub skipped: Vec<SkippedExport>,
    /// Candidate names per category, sorted.
    pub by_category: BTreeMap<PatternCategory, Vec<String>>,
}

impl Discovery {
    pub fn candidates(&self, category: PatternCategory) -> &[String] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// The single resolved entry point.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub module: String,
    pub protocol: Protocol,
    pub category: PatternCategory,
    pub name: String,
    pub value: ExportValue,
    pub discovery: Discovery,
}

/// Resolves the deployable entry point of an agent module.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryPointResolver {
    protocol: Protocol,
}

impl EntryPointResolver {
    /// Create a resolver for apps served with `protocol`.
    pub fn new(protocol: Protocol) -> Self {
        Self { protocol }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Resolve the entry point of `module`.
    pub fn resolve(&self, module: &dyn AgentModule) -> ResolveResult<Resolution> {
        let (discovery, mut groups) = self.scan(module);

        for category in PRIORITY {
            let Some(mut candidates) = groups.remove(&category) else {
                continue;
            };

            if candidates.len() > 1 {
                let mut names: Vec<String> = candidates.into_iter().map(|c| c.name).collect();
                names.sort();
                return Err(ResolveError::AmbiguousPattern {
                    category,
                    protocol: self.protocol,
                    candidates: names,
                });
            }

            let candidate = candidates.remove(0);
            if !candidate.overlapping.is_empty() {
                return Err(ResolveError::OverlappingPattern {
                    name: candidate.name,
                    protocol: self.protocol,
                    categories: candidate.overlapping,
                });
            }

            info!(
                "Resolved entry point {}.{} ({})",
                module.path(),
                candidate.name,
                category
            );
            return Ok(Resolution {
                module: module.path().to_string(),
                protocol: self.protocol,
                category,
                name: candidate.name,
                value: candidate.value,
                discovery,
            });
        }

        Err(ResolveError::NoPatternFound {
            module: module.path().to_string(),
            protocol: self.protocol,
        })
    }

    /// Scan a module without selecting a winner.
    pub fn discover(&self, module: &dyn AgentModule) -> Discovery {
        self.scan(module).0
    }

    fn scan(
        &self,
        module: &dyn AgentModule,
    ) -> (Discovery, BTreeMap<PatternCategory, Vec<Candidate>>) {
        let ctx = MatchContext {
            module_path: module.path(),
            protocol: self.protocol,
        };

        let mut discovery = Discovery::default();
        let names = match module.explicit_exports() {
            Some(all) => {
                info!("Found explicit export list: [{}]", all.join(", "));
                discovery.explicit = true;
                let mut seen = HashSet::new();
                all.iter()
                    .filter(|name| seen.insert(name.as_str()))
                    .cloned()
                    .collect::<Vec<_>>()
            }
            None => module
                .export_names()
                .into_iter()
                .filter(|name| !name.starts_with('_'))
                .collect(),
        };

        let mut groups: BTreeMap<PatternCategory, Vec<Candidate>> = BTreeMap::new();
        for name in names {
            discovery.considered.push(name.clone());

            let value = match module.get(&name) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    discovery.skipped.push(SkippedExport {
                        name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let (category, overlapping) = match classify(&name, &ExportShape::of(&value), &ctx) {
                Classification::Unmatched => {
                    debug!("Ignoring {} ({})", name, value.type_name());
                    continue;
                }
                Classification::Matched(category) => (category, Vec::new()),
                Classification::Overlapping(categories) => {
                    warn!(
                        "{} matches several patterns equally: {:?}",
                        name, categories
                    );
                    (categories[0], categories)
                }
            };

            debug!("Classified {} as {}", name, category);
            groups.entry(category).or_default().push(Candidate {
                name,
                category,
                value,
                overlapping,
            });
        }

        for (category, candidates) in &groups {
            let mut names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
            names.sort();
            info!(
                "Found {}s: [{}]",
                category.label(self.protocol),
                names.join(", ")
            );
            discovery.by_category.insert(*category, names);
        }

        (discovery, groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_module::{AgentDefinition, AppDefinition, InMemoryModule, TeamDefinition};

    fn agent(name: &str) -> AgentDefinition {
        AgentDefinition::new(name)
    }

    fn rest_app() -> AppDefinition {
        AppDefinition::for_agent(Protocol::Rest, agent("Financial Agent"))
    }

    #[test]
    fn test_app_function_beats_agent_variable() {
        let module = InMemoryModule::new("agents.financial")
            .function("create_fastapi_app", rest_app())
            .export("financial_agent", agent("Financial Agent"));

        let resolution = EntryPointResolver::new(Protocol::Rest)
            .resolve(&module)
            .unwrap();

        assert_eq!(resolution.name, "create_fastapi_app");
        assert_eq!(resolution.category, PatternCategory::AppFunction);
        assert_eq!(
            resolution.discovery.candidates(PatternCategory::AgentVariable),
            &["financial_agent".to_string()]
        );
    }

    #[test]
    fn test_two_agent_functions_are_ambiguous() {
        let module = InMemoryModule::new("agents.trading")
            .function("create_trading_agent", agent("Trading"))
            .function("create_agent", agent("Analysis"));

        let err = EntryPointResolver::default().resolve(&module).unwrap_err();
        match err {
            ResolveError::AmbiguousPattern {
                category,
                candidates,
                ..
            } => {
                assert_eq!(category, PatternCategory::AgentFunction);
                assert_eq!(candidates, vec!["create_agent", "create_trading_agent"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_agent_variable_only() {
        let module = InMemoryModule::new("agents.variable").export("financial_agent", agent("F"));

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.category, PatternCategory::AgentVariable);
        assert_eq!(resolution.name, "financial_agent");
    }

    #[test]
    fn test_explicit_list_restricts_discovery() {
        let module = InMemoryModule::new("agents.multi")
            .function("create_fastapi_app", rest_app())
            .function("create_agent", agent("A"))
            .export("financial_agent", agent("A"))
            .with_all(["financial_agent"]);

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.name, "financial_agent");
        assert!(resolution.discovery.explicit);
        assert_eq!(resolution.discovery.considered, vec!["financial_agent"]);
    }

    #[test]
    fn test_explicit_list_duplicates_do_not_cause_ambiguity() {
        let module = InMemoryModule::new("agents.dup")
            .function("create_agent", agent("A"))
            .with_all(["create_agent", "create_agent"]);

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.name, "create_agent");
    }

    #[test]
    fn test_private_names_skipped_without_explicit_list() {
        let module = InMemoryModule::new("agents.private")
            .function("_create_agent", agent("Hidden"))
            .export("team", TeamDefinition::new("Team"));

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.category, PatternCategory::TeamVariable);
    }

    #[test]
    fn test_reexported_function_is_not_a_candidate() {
        let module = InMemoryModule::new("agents.reexport")
            .imported_function("create_agent", "agents.shared", agent("Shared"))
            .export("team", TeamDefinition::new("Team"));

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.name, "team");
        assert!(resolution
            .discovery
            .candidates(PatternCategory::AgentFunction)
            .is_empty());
    }

    #[test]
    fn test_access_errors_are_skipped() {
        let module = InMemoryModule::new("agents.flaky")
            .broken("create_fastapi_app", "import failed")
            .export("agent", agent("A"))
            .with_all(["create_fastapi_app", "agent", "missing"]);

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.name, "agent");
        let skipped: Vec<&str> = resolution
            .discovery
            .skipped
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(skipped, vec!["create_fastapi_app", "missing"]);
    }

    #[test]
    fn test_no_pattern_found() {
        let class = ExportValue::Class {
            path: "agno.agent.Agent".into(),
        };
        let module = InMemoryModule::new("agents.empty")
            .export("Agent", class.clone())
            .function("main", class)
            .function("build_agent", agent("Not a factory name"));

        let err = EntryPointResolver::default().resolve(&module).unwrap_err();
        assert!(matches!(err, ResolveError::NoPatternFound { .. }));
    }

    #[test]
    fn test_overlap_in_winning_category_fails() {
        let module = InMemoryModule::new("agents.overlap")
            .function("create_team_agent", agent("Hybrid"));

        let err = EntryPointResolver::default().resolve(&module).unwrap_err();
        assert!(matches!(err, ResolveError::OverlappingPattern { .. }));
        assert!(err.is_ambiguous());
    }

    #[test]
    fn test_overlap_in_lower_category_is_ignored() {
        let module = InMemoryModule::new("agents.overlap")
            .function("create_fastapi_app", rest_app())
            .function("create_team_agent", agent("Hybrid"));

        let resolution = EntryPointResolver::default().resolve(&module).unwrap();
        assert_eq!(resolution.name, "create_fastapi_app");
    }

    #[test]
    fn test_other_protocol_apps_are_ignored() {
        let module = InMemoryModule::new("agents.agui")
            .export("app", AppDefinition::for_agent(Protocol::Agui, agent("A")))
            .export("agent", agent("A"));

        let rest = EntryPointResolver::new(Protocol::Rest).resolve(&module).unwrap();
        assert_eq!(rest.category, PatternCategory::AgentVariable);

        let agui = EntryPointResolver::new(Protocol::Agui).resolve(&module).unwrap();
        assert_eq!(agui.category, PatternCategory::AppVariable);
    }
}
