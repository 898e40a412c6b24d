//! # dock_module
//!
//! Agent module model for agentdock.
//!
//! An agent module is a mapping of exported names to values: functions,
//! apps, agents, teams, imported classes and plain values. Modules are read
//! from YAML module files or assembled in code, and inspected through the
//! [`AgentModule`] trait.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dock_module::{AgentModule, ModuleReader};
//!
//! let module = ModuleReader::read("agents/financial_agent.yaml", ".").unwrap();
//! for name in module.export_names() {
//!     println!("{} -> {:?}", name, module.get(&name).map(|v| v.type_name()));
//! }
//! ```

pub mod error;
pub mod export;
pub mod models;
pub mod module;
pub mod reader;

pub use error::{ModuleError, ModuleResult};
pub use export::{ExportValue, Factory, FunctionExport};
pub use models::{
    slugify, AgentDefinition, AppDefinition, ModelSpec, Protocol, TeamDefinition, TeamMode,
    ToolSpec,
};
pub use module::{AgentModule, InMemoryModule};
pub use reader::{ManifestModule, ModuleReader, EXPORT_KINDS};
