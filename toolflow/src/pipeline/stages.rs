//! The fixed four-stage descriptor set.

use crate::bundle::ResultSlot;
use crate::config::ArtifactPaths;
use crate::errors::{ChainValidationError, PipelineError};
use crate::process::Invocation;
use crate::tools::{ToolKind, ToolchainRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Static description of one stage: what to run, what it needs and what it
/// must leave behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    /// Display name, used in diagnostics.
    pub name: String,
    /// Which tool runs this stage.
    pub tool: ToolKind,
    /// Executable path.
    pub program: PathBuf,
    /// Positional file arguments.
    pub args: Vec<PathBuf>,
    /// Files that must exist before launch.
    pub inputs: Vec<PathBuf>,
    /// Files that must exist after a zero exit. The first is the primary output.
    pub outputs: Vec<PathBuf>,
    /// Result slot this stage feeds.
    pub slot: ResultSlot,
    /// Whether the primary output is read into the pipeline bundle.
    pub captures_output: bool,
}

impl StageDescriptor {
    fn new(registry: &ToolchainRegistry, tool: ToolKind, slot: ResultSlot) -> Self {
        Self {
            name: tool.display_name().to_string(),
            tool,
            program: registry.path_for(tool),
            args: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            slot,
            captures_output: false,
        }
    }

    /// Sets the argument list; the same files are the required inputs.
    fn consuming(mut self, files: &[&Path]) -> Self {
        self.args = files.iter().map(|p| p.to_path_buf()).collect();
        self.inputs = self.args.clone();
        self
    }

    fn producing(mut self, files: &[&Path]) -> Self {
        self.outputs = files.iter().map(|p| p.to_path_buf()).collect();
        self
    }

    fn captured(mut self) -> Self {
        self.captures_output = true;
        self
    }

    /// Returns the file read into the bundle for capturing stages.
    #[must_use]
    pub fn primary_output(&self) -> Option<&Path> {
        self.outputs.first().map(PathBuf::as_path)
    }

    /// Builds the process invocation for this stage.
    #[must_use]
    pub fn invocation(&self, cwd: &Path, timeout: Option<Duration>) -> Invocation {
        Invocation {
            program: self.program.clone(),
            args: self.args.clone(),
            cwd: cwd.to_path_buf(),
            timeout,
        }
    }
}

/// Builds the four stage descriptors for a run on `input`.
///
/// Pure: no file is touched. Order is lexer, syntax analyzer,
/// intermediate-code generator, DAG builder.
#[must_use]
pub fn build_stages(
    paths: &ArtifactPaths,
    registry: &ToolchainRegistry,
    input: &Path,
) -> Vec<StageDescriptor> {
    vec![
        StageDescriptor::new(registry, ToolKind::Lexer, ResultSlot::Tokens)
            .consuming(&[input])
            .producing(&[&paths.lexer_output])
            .captured(),
        StageDescriptor::new(registry, ToolKind::SyntaxAnalyzer, ResultSlot::Ast)
            .consuming(&[&paths.lexer_output])
            .producing(&[&paths.ast_output])
            .captured(),
        StageDescriptor::new(registry, ToolKind::IntermediateCodeGen, ResultSlot::Tac)
            .consuming(&[&paths.lexer_output])
            .producing(&[&paths.tac_output, &paths.dag_vars]),
        StageDescriptor::new(registry, ToolKind::DagBuilder, ResultSlot::Dag)
            .consuming(&[&paths.tac_output, &paths.dag_vars])
            .producing(&[&paths.dag_output]),
    ]
}

/// Checks that every stage consumes only the run input or files produced by
/// an earlier stage.
///
/// # Errors
///
/// Returns the first stage input that no earlier stage produces.
pub fn validate_chain(stages: &[StageDescriptor], input: &Path) -> Result<(), PipelineError> {
    let mut available: HashSet<&Path> = HashSet::new();
    available.insert(input);

    for stage in stages {
        if let Some(missing) = stage.inputs.iter().find(|p| !available.contains(p.as_path())) {
            return Err(ChainValidationError::new(&stage.name, missing).into());
        }
        available.extend(stage.outputs.iter().map(PathBuf::as_path));
    }
    Ok(())
}

/// Returns the paths in `paths` that do not exist right now.
pub(crate) async fn missing_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    for path in paths {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            missing.push(path.clone());
        }
    }
    missing
}
