//! Agent module file reading.
//!
//! A module file is YAML with an optional `module` path, an optional `all`
//! export list and an `exports` map. Each export body is a single-key map
//! naming its kind (`function`, `app`, `agent`, `team`, `class`, `value`).
//! Bodies are decoded on access so one malformed export does not poison the
//! rest of the module.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ModuleError, ModuleResult};
use crate::export::{ExportValue, FunctionExport};
use crate::models::{AgentDefinition, AppDefinition, TeamDefinition};
use crate::module::AgentModule;

/// Export kinds accepted in a module file.
pub const EXPORT_KINDS: &[&str] = &["function", "app", "agent", "team", "class", "value"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleFile {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    all: Option<Vec<String>>,
    #[serde(default)]
    exports: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionDecl {
    #[serde(default)]
    declared_in: Option<String>,
    #[serde(default)]
    returns: Option<serde_yaml::Value>,
    #[serde(default)]
    raises: Option<String>,
}

/// A module loaded from a module file.
#[derive(Debug, Clone)]
pub struct ManifestModule {
    path: String,
    source: PathBuf,
    all: Option<Vec<String>>,
    exports: BTreeMap<String, serde_yaml::Value>,
}

impl ManifestModule {
    /// File the module was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl AgentModule for ManifestModule {
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
        let body = self
            .exports
            .get(name)
            .ok_or_else(|| ModuleError::MissingExport {
                module: self.path.clone(),
                name: name.to_string(),
            })?;
        decode_export(name, &self.path, body)
    }
}

/// Reader for agent module files.
pub struct ModuleReader;

impl ModuleReader {
    /// Read a module file, deriving its module path relative to `project_root`.
    pub fn read(file: impl AsRef<Path>, project_root: impl AsRef<Path>) -> ModuleResult<ManifestModule> {
        let file = file.as_ref();
        if !file.exists() {
            return Err(ModuleError::NotFound(file.to_path_buf()));
        }
        debug!("Reading agent module from {:?}", file);

        let content = fs::read_to_string(file)?;
        Self::parse_with(&content, file, || {
            Self::module_path_for(file, project_root.as_ref())
        })
    }

    /// Parse module file content.
    pub fn parse(content: &str, default_path: &str, source: &Path) -> ModuleResult<ManifestModule> {
        Self::parse_with(content, source, || Ok(default_path.to_string()))
    }

    /// `default_path` only runs when the file declares no `module`.
    fn parse_with<F>(content: &str, source: &Path, default_path: F) -> ModuleResult<ManifestModule>
    where
        F: FnOnce() -> ModuleResult<String>,
    {
        let invalid = |message: String| ModuleError::InvalidModule {
            path: source.to_path_buf(),
            message,
        };

        let file: ModuleFile = serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?;

        let path = match file.module {
            Some(path) => path,
            None => default_path()?,
        };
        if !is_module_path(&path) {
            return Err(ModuleError::InvalidModulePath(path));
        }

        let mut exports = BTreeMap::new();
        for (key, body) in file.exports {
            let name = key
                .as_str()
                .ok_or_else(|| invalid(format!("export names must be strings, got {:?}", key)))?;
            if !is_identifier(name) {
                return Err(invalid(format!("'{}' is not a valid export name", name)));
            }
            exports.insert(name.to_string(), body);
        }

        debug!("Module '{}' defines {} exports", path, exports.len());
        Ok(ManifestModule {
            path,
            source: source.to_path_buf(),
            all: file.all,
            exports,
        })
    }

    /// Derive the dotted module path of `file`.
    ///
    /// `agents/financial.yaml` under the project root becomes
    /// `agents.financial`.
    pub fn module_path_for(file: &Path, project_root: &Path) -> ModuleResult<String> {
        let relative = match file.strip_prefix(project_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) if file.is_relative() => file.to_path_buf(),
            Err(_) => file.file_name().map(PathBuf::from).unwrap_or_default(),
        };

        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut parts: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        parts.push(stem);

        let path = parts.join(".");
        if !is_module_path(&path) {
            return Err(ModuleError::InvalidModulePath(path));
        }
        Ok(path)
    }

    /// Find module files (`*.yaml`, `*.yml`) below `dir`, skipping hidden
    /// directories.
    pub fn discover(dir: impl AsRef<Path>) -> ModuleResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ModuleError::NotFound(dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .map_or(false, |ext| ext == "yaml" || ext == "yml")
            })
            .collect();

        files.sort();
        Ok(files)
    }
}

/// Decode one export body into a value.
fn decode_export(name: &str, module_path: &str, body: &serde_yaml::Value) -> ModuleResult<ExportValue> {
    let invalid = |message: String| ModuleError::InvalidExport {
        name: name.to_string(),
        message,
    };

    let mapping = body.as_mapping().ok_or_else(|| {
        invalid(format!("expected a map with one of: {}", EXPORT_KINDS.join(", ")))
    })?;

    let mut entries = mapping.iter();
    let (kind, inner) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(invalid(format!(
                "expected exactly one of: {}",
                EXPORT_KINDS.join(", ")
            )))
        }
    };

    let kind = kind.as_str().unwrap_or_default();
    let decoded = match kind {
        "function" => {
            let decl: FunctionDecl =
                serde_yaml::from_value(inner.clone()).map_err(|e| invalid(e.to_string()))?;
            let declared_in = decl
                .declared_in
                .clone()
                .unwrap_or_else(|| module_path.to_string());
            if !is_module_path(&declared_in) {
                return Err(ModuleError::InvalidModulePath(declared_in));
            }

            let func_name = name.to_string();
            let owner = module_path.to_string();
            ExportValue::Function(FunctionExport::new(declared_in, move || {
                call_function(&func_name, &owner, &decl)
            }))
        }
        "app" => ExportValue::App(
            serde_yaml::from_value::<AppDefinition>(inner.clone())
                .map_err(|e| invalid(e.to_string()))?,
        ),
        "agent" => ExportValue::Agent(
            serde_yaml::from_value::<AgentDefinition>(inner.clone())
                .map_err(|e| invalid(e.to_string()))?,
        ),
        "team" => ExportValue::Team(
            serde_yaml::from_value::<TeamDefinition>(inner.clone())
                .map_err(|e| invalid(e.to_string()))?,
        ),
        "class" => {
            let path = inner
                .as_str()
                .ok_or_else(|| invalid("class must name a type path".to_string()))?;
            ExportValue::Class {
                path: path.to_string(),
            }
        }
        "value" => ExportValue::Value(inner.clone()),
        other => {
            return Err(invalid(format!(
                "unknown export kind '{}' (expected one of: {})",
                other,
                EXPORT_KINDS.join(", ")
            )))
        }
    };

    Ok(decoded)
}

/// Evaluate a declared function.
fn call_function(name: &str, module_path: &str, decl: &FunctionDecl) -> ModuleResult<ExportValue> {
    if let Some(message) = &decl.raises {
        return Err(ModuleError::Invocation {
            name: name.to_string(),
            message: message.clone(),
        });
    }

    match &decl.returns {
        None => Ok(ExportValue::Value(serde_yaml::Value::Null)),
        Some(body) => decode_export(name, module_path, body).map_err(|e| ModuleError::Invocation {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

fn is_identifier(name: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"))
        .is_match(name)
}

fn is_module_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_identifier)
}
