//! The module inspection boundary.
//!
//! An [`AgentModule`] is a mapping of exported names to values plus an
//! optional explicit export list. Attribute access may fail per name; callers
//! decide whether that is fatal.

use std::collections::BTreeMap;

use crate::error::{ModuleError, ModuleResult};
use crate::export::{ExportValue, FunctionExport};

/// A loaded module exposing named attributes.
pub trait AgentModule: Send + Sync {
    /// Dotted module path, e.g. `agents.financial_agent`.
    fn path(&self) -> &str;

    /// The module's declared public export list, if any.
    fn explicit_exports(&self) -> Option<&[String]>;

    /// Every attribute name the module defines, private ones included.
    fn export_names(&self) -> Vec<String>;

    /// Fetch the value bound to `name`.
    fn get(&self, name: &str) -> ModuleResult<ExportValue>;
}

/// A module assembled in code.
#[derive(Debug, Clone)]
pub struct InMemoryModule {
    path: String,
    all: Option<Vec<String>>,
    exports: BTreeMap<String, Result<ExportValue, String>>,
}

impl InMemoryModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            all: None,
            exports: BTreeMap::new(),
        }
    }

    /// Bind `name` to `value`.
    pub fn export(mut self, name: impl Into<String>, value: impl Into<ExportValue>) -> Self {
        self.exports.insert(name.into(), Ok(value.into()));
        self
    }

    /// Bind `name` to a function defined in this module returning `value`.
    pub fn function(mut self, name: impl Into<String>, value: impl Into<ExportValue>) -> Self {
        let func = FunctionExport::returning(self.path.clone(), value.into());
        self.exports
            .insert(name.into(), Ok(ExportValue::Function(func)));
        self
    }

    /// Bind `name` to a function imported from `origin`.
    pub fn imported_function(
        mut self,
        name: impl Into<String>,
        origin: impl Into<String>,
        value: impl Into<ExportValue>,
    ) -> Self {
        let func = FunctionExport::returning(origin, value.into());
        self.exports
            .insert(name.into(), Ok(ExportValue::Function(func)));
        self
    }

    /// Bind `name` to an attribute whose access fails with `message`.
    pub fn broken(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.exports.insert(name.into(), Err(message.into()));
        self
    }

    /// Declare the explicit export list.
    pub fn with_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl AgentModule for InMemoryModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn explicit_exports(&self) -> Option<&[String]> {
        self.all.as_deref()
    }

    fn export_names(&self) -> Vec<String> {
        self.exports.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> ModuleResult<ExportValue> {
        match self.exports.get(name) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(ModuleError::InvalidExport {
                name: name.to_string(),
                message: message.clone(),
            }),
            None => Err(ModuleError::MissingExport {
                module: self.path.clone(),
                name: name.to_string(),
            }),
        }
    }
}
