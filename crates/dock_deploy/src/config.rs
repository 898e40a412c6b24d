//! Deployment configuration types.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use dock_module::{ManifestModule, ModuleReader, Protocol};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployResult};

pub const DEFAULT_MAX_CONTAINERS: u32 = 10;
pub const DEFAULT_MIN_CONTAINERS: u32 = 1;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_MAX_CONCURRENT: u32 = 100;

/// Name of the optional project configuration file.
pub const CONFIG_FILE_NAME: &str = "agentdock.yaml";

/// Paths served without a token.
pub const ALWAYS_PUBLIC_PATHS: [&str; 2] = ["/health", "/openapi.json"];

/// Documentation pages, public unless docs are protected.
pub const DOC_PATHS: [&str; 2] = ["/docs", "/redoc"];

/// Paths reachable without a token for the given docs setting.
pub fn public_paths(protect_docs: bool) -> Vec<&'static str> {
    let mut paths = ALWAYS_PUBLIC_PATHS.to_vec();
    if !protect_docs {
        paths.extend(DOC_PATHS);
    }
    paths
}

/// Scaling parameters of a deployment.
///
/// These are read and reported; enforcing them is up to the platform that
/// runs the app.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScalingConfig {
    /// Upper bound on concurrently running containers
    pub max_containers: u32,
    /// Containers kept warm
    pub min_containers: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Concurrent inputs per container
    pub max_concurrent: u32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            max_containers: DEFAULT_MAX_CONTAINERS,
            min_containers: DEFAULT_MIN_CONTAINERS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl ScalingConfig {
    /// Read scaling parameters from the process environment.
    pub fn from_env() -> DeployResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read scaling parameters through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> DeployResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            max_containers: parse_var(&lookup, "MAX_CONTAINERS", DEFAULT_MAX_CONTAINERS)?,
            min_containers: parse_var(&lookup, "MIN_CONTAINERS", DEFAULT_MIN_CONTAINERS)?,
            timeout_seconds: parse_var(&lookup, "TIMEOUT", DEFAULT_TIMEOUT_SECONDS)?,
            max_concurrent: parse_var(&lookup, "MAX_CONCURRENT", DEFAULT_MAX_CONCURRENT)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DeployResult<()> {
        if self.max_containers == 0 {
            return Err(DeployError::Configuration(
                "MAX_CONTAINERS must be at least 1".to_string(),
            ));
        }
        if self.min_containers > self.max_containers {
            return Err(DeployError::Configuration(format!(
                "MIN_CONTAINERS ({}) exceeds MAX_CONTAINERS ({})",
                self.min_containers, self.max_containers
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(DeployError::Configuration(
                "TIMEOUT must be at least 1 second".to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(DeployError::Configuration(
                "MAX_CONCURRENT must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> DeployResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            DeployError::Configuration(format!("{} must be a non-negative integer, got '{}'", key, raw))
        }),
        _ => Ok(default),
    }
}

/// On-disk shape of `agentdock.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    agent_file: Option<PathBuf>,
    protocol: Option<Protocol>,
    enable_auth: Option<bool>,
    protect_docs: Option<bool>,
}

/// Everything a deployment stage needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Agent module file, relative to the project root or absolute
    pub agent_file: PathBuf,
    /// Directory holding requirements.txt, .env and the module tree
    pub project_root: PathBuf,
    /// Protocol the app is served with
    pub protocol: Protocol,
    /// Whether bearer-token authentication guards the app
    pub enable_auth: bool,
    /// Whether /docs and /redoc also require a token
    pub protect_docs: bool,
    /// Scaling parameters
    pub scaling: ScalingConfig,
}

impl DeployConfig {
    pub fn new(agent_file: impl Into<PathBuf>) -> Self {
        Self {
            agent_file: agent_file.into(),
            project_root: PathBuf::from("."),
            protocol: Protocol::default(),
            enable_auth: false,
            protect_docs: false,
            scaling: ScalingConfig::default(),
        }
    }

    /// Load `agentdock.yaml`. The file's directory becomes the project root.
    pub fn from_file(path: impl AsRef<Path>) -> DeployResult<Self> {
        let path = path.as_ref();
        debug!("Reading deployment config from {:?}", path);
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&content)?;

        let agent_file = file.agent_file.ok_or_else(|| {
            DeployError::Configuration(format!("{} does not set agent_file", path.display()))
        })?;

        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::new(agent_file).project_root(root);
        if let Some(protocol) = file.protocol {
            config = config.protocol(protocol);
        }
        if let Some(enable_auth) = file.enable_auth {
            config = config.enable_auth(enable_auth);
        }
        if let Some(protect_docs) = file.protect_docs {
            config = config.protect_docs(protect_docs);
        }
        Ok(config)
    }

    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn enable_auth(mut self, enable: bool) -> Self {
        self.enable_auth = enable;
        self
    }

    pub fn protect_docs(mut self, protect: bool) -> Self {
        self.protect_docs = protect;
        self
    }

    pub fn scaling(mut self, scaling: ScalingConfig) -> Self {
        self.scaling = scaling;
        self
    }

    /// Path of the agent file as seen from the working directory.
    pub fn agent_path(&self) -> PathBuf {
        if self.agent_file.is_absolute() {
            self.agent_file.clone()
        } else {
            self.project_root.join(&self.agent_file)
        }
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.project_root.join("requirements.txt")
    }

    pub fn env_path(&self) -> PathBuf {
        self.project_root.join(".env")
    }

    /// Deployment name: the agent file stem, suffixed `_agui` for AG-UI.
    pub fn app_name(&self) -> String {
        let stem = self
            .agent_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        match self.protocol {
            Protocol::Rest => stem,
            Protocol::Agui => format!("{}_agui", stem),
        }
    }

    /// Whether auth actually applies. AG-UI apps are served without it.
    pub fn auth_active(&self) -> bool {
        self.enable_auth && self.protocol == Protocol::Rest
    }

    /// Check the configuration before any stage runs.
    pub fn validate(&self) -> DeployResult<()> {
        let agent_path = self.agent_path();
        if !agent_path.is_file() {
            return Err(DeployError::AgentFileNotFound(agent_path));
        }
        self.scaling.validate()?;

        if self.enable_auth && self.protocol == Protocol::Agui {
            warn!("Authentication is not supported for AG-UI apps; serving without it");
        }

        info!("Agent file: {}", agent_path.display());
        info!("App name: {}", self.app_name());
        if self.auth_active() {
            info!(
                "Authentication: ENABLED, docs protection: {}",
                if self.protect_docs { "ENABLED" } else { "DISABLED" }
            );
        } else {
            info!("Authentication: DISABLED (public access)");
        }
        Ok(())
    }

    /// Read the agent module this configuration points at.
    pub fn load_module(&self) -> DeployResult<ManifestModule> {
        Ok(ModuleReader::read(self.agent_path(), &self.project_root)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_scaling_defaults() {
        let scaling = ScalingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(scaling, ScalingConfig::default());
        assert_eq!(scaling.max_containers, 10);
        assert_eq!(scaling.timeout_seconds, 300);
    }

    #[test]
    fn test_scaling_overrides() {
        let scaling =
            ScalingConfig::from_lookup(lookup(&[("MAX_CONTAINERS", "4"), ("TIMEOUT", " 60 ")]))
                .unwrap();
        assert_eq!(scaling.max_containers, 4);
        assert_eq!(scaling.timeout_seconds, 60);
        assert_eq!(scaling.max_concurrent, 100);
    }

    #[test]
    fn test_scaling_rejects_non_integer() {
        let err = ScalingConfig::from_lookup(lookup(&[("MAX_CONCURRENT", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MAX_CONCURRENT"));
    }

    #[test]
    fn test_scaling_rejects_min_above_max() {
        let err = ScalingConfig::from_lookup(lookup(&[
            ("MAX_CONTAINERS", "2"),
            ("MIN_CONTAINERS", "3"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DeployError::Configuration(_)));
    }

    #[test]
    fn test_app_name() {
        let config = DeployConfig::new("agents/financial_agent.yaml").project_root("/srv/app");
        assert_eq!(config.app_name(), "financial_agent");

        let agui = config.protocol(Protocol::Agui);
        assert_eq!(agui.app_name(), "financial_agent_agui");
    }

    #[test]
    fn test_auth_not_active_for_agui() {
        let config = DeployConfig::new("a.yaml").enable_auth(true);
        assert!(config.auth_active());
        assert!(!config.protocol(Protocol::Agui).auth_active());
    }

    #[test]
    fn test_public_paths() {
        assert_eq!(public_paths(true), vec!["/health", "/openapi.json"]);
        assert_eq!(
            public_paths(false),
            vec!["/health", "/openapi.json", "/docs", "/redoc"]
        );
    }

    #[test]
    fn test_validate_missing_agent_file() {
        let temp = tempdir().unwrap();
        let config = DeployConfig::new("missing.yaml").project_root(temp.path());
        assert!(matches!(
            config.validate(),
            Err(DeployError::AgentFileNotFound(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "agent_file: agents/team.yaml\nprotocol: agui\nenable_auth: true\n",
        )
        .unwrap();

        let config = DeployConfig::from_file(&path).unwrap();
        assert_eq!(config.project_root, temp.path());
        assert_eq!(config.agent_path(), temp.path().join("agents/team.yaml"));
        assert_eq!(config.protocol, Protocol::Agui);
        assert!(config.enable_auth);
        assert!(!config.protect_docs);
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "agent_file: a.yaml\nauth_token: secret\n").unwrap();
        assert!(matches!(
            DeployConfig::from_file(&path),
            Err(DeployError::Yaml(_))
        ));
    }
}
