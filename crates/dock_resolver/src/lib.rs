//! # dock_resolver
//!
//! Entry-point resolution for agentdock.
//!
//! Given an agent module whose exported surface is unconstrained, the
//! resolver picks the single export that represents the deployable entry
//! point. Exports are classified into six pattern categories with a strict
//! priority order:
//!
//! 1. Function returning an app (`create_fastapi_app` / `create_agui_app`)
//! 2. Function returning an Agent (`create_agent`)
//! 3. Function returning a Team (`create_team`)
//! 4. Directly exported app
//! 5. Directly exported Agent
//! 6. Directly exported Team
//!
//! The highest non-empty category wins; two candidates in it is an error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dock_module::{ModuleReader, Protocol};
//! use dock_resolver::EntryPointResolver;
//!
//! let module = ModuleReader::read("agents/financial_agent.yaml", ".").unwrap();
//! let resolution = EntryPointResolver::new(Protocol::Rest).resolve(&module).unwrap();
//! println!("{} ({})", resolution.name, resolution.category);
//! ```

pub mod category;
pub mod error;
pub mod resolver;
pub mod rules;

pub use category::{supported_patterns, PatternCategory, PRIORITY};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{Candidate, Discovery, EntryPointResolver, Resolution, SkippedExport};
pub use rules::{classify, Classification, ExportShape, MatchContext, MatchStrength, RULES};
