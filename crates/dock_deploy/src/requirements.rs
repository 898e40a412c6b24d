//! Dependency manifest handling.
//!
//! The project's `requirements.txt` lists the packages the app image needs.
//! Editable installs and nested requirement files are not followed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use dock_module::Protocol;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployResult};

/// Packages every deployment needs regardless of the manifest.
pub fn baseline_packages(protocol: Protocol) -> &'static [&'static str] {
    match protocol {
        Protocol::Rest => &["GitPython"],
        Protocol::Agui => &["GitPython", "ag-ui-protocol"],
    }
}

/// A manifest line that was not turned into a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub content: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EditableInstall,
    RecursiveRequirement,
}

/// Parsed dependency manifest.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementsManifest {
    pub source: PathBuf,
    /// Sorted, deduplicated package specifications, baseline included
    pub packages: Vec<String>,
    pub skipped: Vec<SkippedLine>,
}

impl RequirementsManifest {
    /// Load `requirements.txt` from `path`. The file is required.
    pub fn load(path: impl AsRef<Path>, protocol: Protocol) -> DeployResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DeployError::RequirementsNotFound(path.to_path_buf()));
        }
        info!("Loading dependencies from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path, protocol)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, source: &Path, protocol: Protocol) -> DeployResult<Self> {
        let baseline = baseline_packages(protocol);
        let mut packages: BTreeSet<String> = baseline.iter().map(|p| p.to_string()).collect();
        let mut skipped = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line_num = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let reason = if line.starts_with("-e ") {
                Some(SkipReason::EditableInstall)
            } else if line.starts_with("-r ") {
                Some(SkipReason::RecursiveRequirement)
            } else {
                None
            };
            if let Some(reason) = reason {
                warn!("Line {}: skipping {}: {}", line_num, reason.describe(), line);
                skipped.push(SkippedLine {
                    line: line_num,
                    content: line.to_string(),
                    reason,
                });
                continue;
            }

            let spec = match line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => line,
            };
            if !spec.is_empty() {
                debug!("Added: {}", spec);
                packages.insert(spec.to_string());
            }
        }

        if packages.len() <= baseline.len() {
            return Err(DeployError::NoDependencies(source.to_path_buf()));
        }

        info!("Total dependencies: {}", packages.len());
        Ok(Self {
            source: source.to_path_buf(),
            packages: packages.into_iter().collect(),
            skipped,
        })
    }
}

impl SkipReason {
    fn describe(&self) -> &'static str {
        match self {
            SkipReason::EditableInstall => "editable install",
            SkipReason::RecursiveRequirement => "recursive requirement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str, protocol: Protocol) -> DeployResult<RequirementsManifest> {
        RequirementsManifest::parse(content, Path::new("requirements.txt"), protocol)
    }

    #[test]
    fn test_parse_strips_comments_and_sorts() {
        let manifest = parse(
            "# agents\nagno>=1.5.0\n\nyfinance  # market data\nopenai\nagno>=1.5.0\n",
            Protocol::Rest,
        )
        .unwrap();

        assert_eq!(
            manifest.packages,
            vec!["GitPython", "agno>=1.5.0", "openai", "yfinance"]
        );
        assert!(manifest.skipped.is_empty());
    }

    #[test]
    fn test_parse_skips_editable_and_recursive() {
        let manifest = parse(
            "agno\n-e ./local_tools\n-r extra-requirements.txt\n",
            Protocol::Rest,
        )
        .unwrap();

        assert_eq!(manifest.packages, vec!["GitPython", "agno"]);
        assert_eq!(manifest.skipped.len(), 2);
        assert_eq!(manifest.skipped[0].line, 2);
        assert_eq!(manifest.skipped[0].reason, SkipReason::EditableInstall);
        assert_eq!(manifest.skipped[1].reason, SkipReason::RecursiveRequirement);
    }

    #[test]
    fn test_agui_baseline() {
        let manifest = parse("agno\n", Protocol::Agui).unwrap();
        assert_eq!(manifest.packages, vec!["GitPython", "ag-ui-protocol", "agno"]);
    }

    #[test]
    fn test_baseline_only_is_rejected() {
        let err = parse("# nothing here\n-e ./pkg\n   # indented comment\n", Protocol::Rest)
            .unwrap_err();
        assert!(matches!(err, DeployError::NoDependencies(_)));

        let err = parse("GitPython\n", Protocol::Rest).unwrap_err();
        assert!(matches!(err, DeployError::NoDependencies(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RequirementsManifest::load("/nonexistent/requirements.txt", Protocol::Rest)
            .unwrap_err();
        assert!(matches!(err, DeployError::RequirementsNotFound(_)));
        assert!(err.to_string().contains("pip freeze"));
    }
}
