//! Classification rules mapping an export to a pattern category.
//!
//! The rules form an ordered table, one per category. Classification is a
//! pure function of the export name, its shape and the match context, so it
//! can be tested without a module.

use dock_module::{ExportValue, Protocol};

use crate::category::PatternCategory;

/// Structural view of an export value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportShape<'a> {
    Function { declared_in: &'a str },
    App(Protocol),
    Agent,
    Team,
    Other,
}

impl<'a> ExportShape<'a> {
    pub fn of(value: &'a ExportValue) -> Self {
        match value {
            ExportValue::Function(f) => ExportShape::Function {
                declared_in: f.declared_in(),
            },
            ExportValue::App(app) => ExportShape::App(app.protocol),
            ExportValue::Agent(_) => ExportShape::Agent,
            ExportValue::Team(_) => ExportShape::Team,
            ExportValue::Class { .. } | ExportValue::Value(_) => ExportShape::Other,
        }
    }
}

/// What classification is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub module_path: &'a str,
    pub protocol: Protocol,
}

/// How strongly a rule matched. Exact beats any keyword match; among
/// keyword matches the higher keyword count wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrength {
    Keyword(u8),
    Exact,
}

type Matcher = fn(&str, &ExportShape<'_>, &MatchContext<'_>) -> Option<MatchStrength>;

/// One row of the rule table.
pub struct PatternRule {
    pub category: PatternCategory,
    matcher: Matcher,
}

impl PatternRule {
    pub fn evaluate(
        &self,
        name: &str,
        shape: &ExportShape<'_>,
        ctx: &MatchContext<'_>,
    ) -> Option<MatchStrength> {
        (self.matcher)(name, shape, ctx)
    }
}

/// Rules in priority order.
pub const RULES: [PatternRule; 6] = [
    PatternRule {
        category: PatternCategory::AppFunction,
        matcher: match_app_function,
    },
    PatternRule {
        category: PatternCategory::AgentFunction,
        matcher: match_agent_function,
    },
    PatternRule {
        category: PatternCategory::TeamFunction,
        matcher: match_team_function,
    },
    PatternRule {
        category: PatternCategory::AppVariable,
        matcher: match_app_variable,
    },
    PatternRule {
        category: PatternCategory::AgentVariable,
        matcher: match_agent_variable,
    },
    PatternRule {
        category: PatternCategory::TeamVariable,
        matcher: match_team_variable,
    },
];

/// Outcome of classifying one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Unmatched,
    Matched(PatternCategory),
    /// Several rules matched equally well; categories in priority order.
    Overlapping(Vec<PatternCategory>),
}

/// Classify an export against every rule.
pub fn classify(name: &str, shape: &ExportShape<'_>, ctx: &MatchContext<'_>) -> Classification {
    let matches: Vec<(PatternCategory, MatchStrength)> = RULES
        .iter()
        .filter_map(|rule| rule.evaluate(name, shape, ctx).map(|s| (rule.category, s)))
        .collect();

    let best = match matches.iter().map(|(_, s)| *s).max() {
        Some(best) => best,
        None => return Classification::Unmatched,
    };

    let winners: Vec<PatternCategory> = matches
        .into_iter()
        .filter(|(_, s)| *s == best)
        .map(|(c, _)| c)
        .collect();

    match winners.as_slice() {
        [single] => Classification::Matched(*single),
        _ => Classification::Overlapping(winners),
    }
}

/// Functions only count when defined in the module being resolved.
fn own_function(shape: &ExportShape<'_>, ctx: &MatchContext<'_>) -> bool {
    matches!(shape, ExportShape::Function { declared_in } if *declared_in == ctx.module_path)
}

fn keyword_match(
    name: &str,
    shape: &ExportShape<'_>,
    ctx: &MatchContext<'_>,
    exact: &str,
    keywords: &[&str],
) -> Option<MatchStrength> {
    if !own_function(shape, ctx) {
        return None;
    }
    if name == exact {
        return Some(MatchStrength::Exact);
    }
    let lower = name.to_lowercase();
    if name.starts_with("create") && keywords.iter().all(|k| lower.contains(k)) {
        return Some(MatchStrength::Keyword(keywords.len() as u8));
    }
    None
}

fn match_app_function(
    name: &str,
    shape: &ExportShape<'_>,
    ctx: &MatchContext<'_>,
) -> Option<MatchStrength> {
    keyword_match(
        name,
        shape,
        ctx,
        ctx.protocol.app_factory_name(),
        &[ctx.protocol.app_keyword(), "app"],
    )
}

fn match_agent_function(
    name: &str,
    shape: &ExportShape<'_>,
    ctx: &MatchContext<'_>,
) -> Option<MatchStrength> {
    keyword_match(name, shape, ctx, "create_agent", &["agent"])
}

fn match_team_function(
    name: &str,
    shape: &ExportShape<'_>,
    ctx: &MatchContext<'_>,
) -> Option<MatchStrength> {
    keyword_match(name, shape, ctx, "create_team", &["team"])
}

fn match_app_variable(
    _name: &str,
    shape: &ExportShape<'_>,
    ctx: &MatchContext<'_>,
) -> Option<MatchStrength> {
    match shape {
        ExportShape::App(protocol) if *protocol == ctx.protocol => Some(MatchStrength::Exact),
        _ => None,
    }
}

fn match_agent_variable(
    _name: &str,
    shape: &ExportShape<'_>,
    _ctx: &MatchContext<'_>,
) -> Option<MatchStrength> {
    matches!(shape, ExportShape::Agent).then_some(MatchStrength::Exact)
}

fn match_team_variable(
    _name: &str,
    shape: &ExportShape<'_>,
    _ctx: &MatchContext<'_>,
) -> Option<MatchStrength> {
    matches!(shape, ExportShape::Team).then_some(MatchStrength::Exact)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = "agents.demo";

    fn rest() -> MatchContext<'static> {
        MatchContext {
            module_path: MODULE,
            protocol: Protocol::Rest,
        }
    }

    fn func(declared_in: &str) -> ExportShape<'_> {
        ExportShape::Function { declared_in }
    }

    #[test]
    fn test_rule_table_follows_priority() {
        let order: Vec<PatternCategory> = RULES.iter().map(|r| r.category).collect();
        assert_eq!(order, crate::category::PRIORITY.to_vec());
    }

    #[test]
    fn test_exact_function_names() {
        let ctx = rest();
        assert_eq!(
            classify("create_fastapi_app", &func(MODULE), &ctx),
            Classification::Matched(PatternCategory::AppFunction)
        );
        assert_eq!(
            classify("create_agent", &func(MODULE), &ctx),
            Classification::Matched(PatternCategory::AgentFunction)
        );
        assert_eq!(
            classify("create_team", &func(MODULE), &ctx),
            Classification::Matched(PatternCategory::TeamFunction)
        );
    }

    #[test]
    fn test_keyword_function_names() {
        let ctx = rest();
        assert_eq!(
            classify("create_trading_agent", &func(MODULE), &ctx),
            Classification::Matched(PatternCategory::AgentFunction)
        );
        assert_eq!(
            classify("create_research_team", &func(MODULE), &ctx),
            Classification::Matched(PatternCategory::TeamFunction)
        );
        assert_eq!(
            classify("createFastAPIApp", &func(MODULE), &ctx),
            Classification::Matched(PatternCategory::AppFunction)
        );
    }

    #[test]
    fn test_multi_keyword_app_beats_agent_keyword() {
        // agent keyword present, but the app rule matches two keywords
        assert_eq!(
            classify("create_agent_fastapi_app", &func(MODULE), &rest()),
            Classification::Matched(PatternCategory::AppFunction)
        );
    }

    #[test]
    fn test_equal_keyword_overlap() {
        assert_eq!(
            classify("create_team_agent", &func(MODULE), &rest()),
            Classification::Overlapping(vec![
                PatternCategory::AgentFunction,
                PatternCategory::TeamFunction
            ])
        );
    }

    #[test]
    fn test_names_without_create_prefix_are_ignored() {
        let ctx = rest();
        assert_eq!(classify("build_agent", &func(MODULE), &ctx), Classification::Unmatched);
        assert_eq!(classify("main", &func(MODULE), &ctx), Classification::Unmatched);
    }

    #[test]
    fn test_imported_functions_never_match() {
        let ctx = rest();
        assert_eq!(
            classify("create_agent", &func("agno.helpers"), &ctx),
            Classification::Unmatched
        );
        assert_eq!(
            classify("create_fastapi_app", &func("agents.other"), &ctx),
            Classification::Unmatched
        );
    }

    #[test]
    fn test_app_factory_keyword_depends_on_protocol() {
        let agui = MatchContext {
            module_path: MODULE,
            protocol: Protocol::Agui,
        };
        assert_eq!(
            classify("create_agui_app", &func(MODULE), &agui),
            Classification::Matched(PatternCategory::AppFunction)
        );
        assert_eq!(
            classify("create_fastapi_app", &func(MODULE), &agui),
            Classification::Unmatched
        );
    }

    #[test]
    fn test_variables_classify_by_type() {
        let ctx = rest();
        assert_eq!(
            classify("anything", &ExportShape::App(Protocol::Rest), &ctx),
            Classification::Matched(PatternCategory::AppVariable)
        );
        assert_eq!(
            classify("anything", &ExportShape::App(Protocol::Agui), &ctx),
            Classification::Unmatched
        );
        assert_eq!(
            classify("create_agent", &ExportShape::Agent, &ctx),
            Classification::Matched(PatternCategory::AgentVariable)
        );
        assert_eq!(
            classify("team", &ExportShape::Team, &ctx),
            Classification::Matched(PatternCategory::TeamVariable)
        );
        assert_eq!(
            classify("Agent", &ExportShape::Other, &ctx),
            Classification::Unmatched
        );
    }

    #[test]
    fn test_match_strength_order() {
        assert!(MatchStrength::Exact > MatchStrength::Keyword(2));
        assert!(MatchStrength::Keyword(2) > MatchStrength::Keyword(1));
    }
}
