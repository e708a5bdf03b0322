//! Registry mapping the pipeline's tools to executable locations.

use super::ToolKind;
use crate::config::{PipelineConfig, ToolNames};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A tool resolved to a path, with the result of its existence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    /// Which tool this is.
    pub kind: ToolKind,
    /// Where the executable is expected.
    pub path: PathBuf,
    /// Whether the path existed when the reference was built.
    pub exists: bool,
}

impl ToolRef {
    /// Returns the logical tool name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }
}

/// A required tool that was not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTool {
    /// Which tool is missing.
    pub kind: ToolKind,
    /// Where it was looked for.
    pub path: PathBuf,
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self
            .path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        write!(f, "- {} executable ('{}') not found.", self.kind, file)
    }
}

/// Read-only registry of the four tool executables.
///
/// Path construction is pure. Only [`resolve`](Self::resolve) and
/// [`verify_all`](Self::verify_all) touch the filesystem, and neither fails:
/// absence is reported as data for the caller to act on.
#[derive(Debug, Clone)]
pub struct ToolchainRegistry {
    base_dir: PathBuf,
    names: ToolNames,
}

impl ToolchainRegistry {
    /// Creates a registry from the configured base directory and names.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
            names: config.tools.clone(),
        }
    }

    /// Returns the base directory executables are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the expected executable path for `kind` without any I/O.
    #[must_use]
    pub fn path_for(&self, kind: ToolKind) -> PathBuf {
        self.base_dir.join(self.names.file_name(kind))
    }

    /// Resolves `kind` and checks whether the executable exists.
    #[must_use]
    pub fn resolve(&self, kind: ToolKind) -> ToolRef {
        let path = self.path_for(kind);
        let exists = path.is_file();
        debug!(tool = %kind, path = %path.display(), exists, "Resolved tool");
        ToolRef { kind, path, exists }
    }

    /// Resolves a tool by logical name (see [`ToolKind`]'s `FromStr`).
    #[must_use]
    pub fn resolve_by_name(&self, name: &str) -> Option<ToolRef> {
        name.parse::<ToolKind>().ok().map(|kind| self.resolve(kind))
    }

    /// Resolves every tool, in pipeline order.
    #[must_use]
    pub fn tool_refs(&self) -> Vec<ToolRef> {
        ToolKind::ALL.into_iter().map(|kind| self.resolve(kind)).collect()
    }

    /// Lists every tool whose executable is absent. Empty means runnable.
    #[must_use]
    pub fn verify_all(&self) -> Vec<MissingTool> {
        let missing: Vec<MissingTool> = self
            .tool_refs()
            .into_iter()
            .filter(|tool| !tool.exists)
            .map(|tool| MissingTool {
                kind: tool.kind,
                path: tool.path,
            })
            .collect();

        if !missing.is_empty() {
            warn!(
                missing = missing.len(),
                base_dir = %self.base_dir.display(),
                "Toolchain incomplete"
            );
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch_tool(dir: &Path, kind: ToolKind) {
        let names = ToolNames::default();
        fs::write(dir.join(names.file_name(kind)), b"#!/bin/sh\n").unwrap();
    }

    #[test]
    fn test_path_for_is_pure() {
        let registry = ToolchainRegistry::new(&PipelineConfig::new("/nonexistent/tools"));
        let path = registry.path_for(ToolKind::Lexer);
        assert!(path.starts_with("/nonexistent/tools"));
        assert!(path.to_string_lossy().contains("lexical"));
    }

    #[test]
    fn test_verify_all_reports_every_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        touch_tool(dir.path(), ToolKind::Lexer);
        touch_tool(dir.path(), ToolKind::DagBuilder);

        let registry = ToolchainRegistry::new(&PipelineConfig::new(dir.path()));
        let missing = registry.verify_all();

        let kinds: Vec<ToolKind> = missing.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![ToolKind::SyntaxAnalyzer, ToolKind::IntermediateCodeGen]);
    }

    #[test]
    fn test_verify_all_empty_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        for kind in ToolKind::ALL {
            touch_tool(dir.path(), kind);
        }

        let registry = ToolchainRegistry::new(&PipelineConfig::new(dir.path()));
        assert!(registry.verify_all().is_empty());
        assert!(registry.tool_refs().iter().all(|t| t.exists));
    }

    #[test]
    fn test_verify_all_sees_tools_removed_later() {
        let dir = tempfile::tempdir().unwrap();
        for kind in ToolKind::ALL {
            touch_tool(dir.path(), kind);
        }
        let registry = ToolchainRegistry::new(&PipelineConfig::new(dir.path()));
        assert!(registry.verify_all().is_empty());

        fs::remove_file(registry.path_for(ToolKind::SyntaxAnalyzer)).unwrap();
        assert_eq!(registry.verify_all().len(), 1);
    }

    #[test]
    fn test_resolve_by_name() {
        let registry = ToolchainRegistry::new(&PipelineConfig::new("/tools"));
        let tool = registry.resolve_by_name("DAG Builder").unwrap();
        assert_eq!(tool.kind, ToolKind::DagBuilder);
        assert_eq!(tool.name(), "DAG Builder");
        assert!(!tool.exists);
        assert!(registry.resolve_by_name("linker").is_none());
    }

    #[test]
    fn test_missing_tool_display() {
        let missing = MissingTool {
            kind: ToolKind::SyntaxAnalyzer,
            path: PathBuf::from("/tools/syntax_analyzer"),
        };
        assert_eq!(
            missing.to_string(),
            "- Syntax Analyzer executable ('syntax_analyzer') not found."
        );
    }
}
