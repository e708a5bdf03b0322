//! Configuration for the toolchain layout.
//!
//! Everything the orchestrator touches lives under one base directory: the
//! four executables, the intermediate files they exchange, and the two
//! pre-existing reference files shown in place of the later stages' output.

use crate::errors::ConfigError;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the executables and all pipeline files. Also the
    /// working directory of every stage process.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Executable base names.
    #[serde(default)]
    pub tools: ToolNames,
    /// Intermediate and reference file names.
    #[serde(default)]
    pub files: FileLayout,
    /// Upper bound on a single stage's wall-clock time. `None` waits forever.
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_secs: Option<f64>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

#[allow(clippy::unnecessary_wraps)]
fn default_stage_timeout() -> Option<f64> {
    Some(120.0)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            tools: ToolNames::default(),
            files: FileLayout::default(),
            stage_timeout_secs: default_stage_timeout(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration rooted at `base_dir` with default names.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the stage timeout in seconds.
    #[must_use]
    pub fn with_stage_timeout(mut self, seconds: f64) -> Self {
        self.stage_timeout_secs = Some(seconds);
        self
    }

    /// Disables the stage timeout.
    #[must_use]
    pub fn without_stage_timeout(mut self) -> Self {
        self.stage_timeout_secs = None;
        self
    }

    /// Replaces the executable names.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolNames) -> Self {
        self.tools = tools;
        self
    }

    /// Replaces the file layout.
    #[must_use]
    pub fn with_files(mut self, files: FileLayout) -> Self {
        self.files = files;
        self
    }

    /// Gets the stage timeout as a `Duration`.
    #[must_use]
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Resolves every file name against the base directory.
    #[must_use]
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let join = |name: &str| self.base_dir.join(name);
        ArtifactPaths {
            lexer_output: join(&self.files.lexer_output),
            ast_output: join(&self.files.ast_output),
            tac_output: join(&self.files.tac_output),
            dag_vars: join(&self.files.dag_vars),
            dag_output: join(&self.files.dag_output),
            reference_tac: join(&self.files.reference_tac),
            reference_dag: join(&self.files.reference_dag),
        }
    }

    /// Checks the configuration for values that would break a run.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or duplicated file names and for a
    /// timeout that is not positive or does not fit in a `Duration`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (role, name) in self.files.entries() {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyFileName { role });
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateFileName {
                    name: name.to_string(),
                });
            }
        }

        if let Some(secs) = self.stage_timeout_secs {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::InvalidTimeout(secs.to_string()));
            }
        }

        Ok(())
    }
}

/// Executable base names, without the platform suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolNames {
    /// Lexical analyzer.
    pub lexer: String,
    /// Syntax analyzer.
    pub syntax_analyzer: String,
    /// Intermediate-code generator.
    pub intermediate_gen: String,
    /// DAG builder.
    pub dag_builder: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            lexer: ToolKind::Lexer.default_base_name().to_string(),
            syntax_analyzer: ToolKind::SyntaxAnalyzer.default_base_name().to_string(),
            intermediate_gen: ToolKind::IntermediateCodeGen.default_base_name().to_string(),
            dag_builder: ToolKind::DagBuilder.default_base_name().to_string(),
        }
    }
}

impl ToolNames {
    /// Returns the base name configured for `kind`.
    #[must_use]
    pub fn base_name(&self, kind: ToolKind) -> &str {
        match kind {
            ToolKind::Lexer => &self.lexer,
            ToolKind::SyntaxAnalyzer => &self.syntax_analyzer,
            ToolKind::IntermediateCodeGen => &self.intermediate_gen,
            ToolKind::DagBuilder => &self.dag_builder,
        }
    }

    /// Returns the executable file name for `kind` on this platform.
    #[must_use]
    pub fn file_name(&self, kind: ToolKind) -> String {
        format!("{}{}", self.base_name(kind), std::env::consts::EXE_SUFFIX)
    }
}

/// File names exchanged between stages, relative to the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLayout {
    /// Token table written by the lexer.
    pub lexer_output: String,
    /// Tree text written by the syntax analyzer.
    pub ast_output: String,
    /// Three-address code written by the intermediate-code generator.
    pub tac_output: String,
    /// Variable list written by the intermediate-code generator.
    pub dag_vars: String,
    /// Graph description written by the DAG builder.
    pub dag_output: String,
    /// Pre-existing three-address code shown in the TAC view.
    pub reference_tac: String,
    /// Pre-existing graph description shown in the DAG view.
    pub reference_dag: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            lexer_output: "lexer_output.txt".to_string(),
            ast_output: "ast_output.txt".to_string(),
            tac_output: "3ac_output.txt".to_string(),
            dag_vars: "dag_vars.txt".to_string(),
            dag_output: "dag.dot".to_string(),
            reference_tac: "3ac_output1.txt".to_string(),
            reference_dag: "dag1.dot".to_string(),
        }
    }
}

impl FileLayout {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("lexer_output", &self.lexer_output),
            ("ast_output", &self.ast_output),
            ("tac_output", &self.tac_output),
            ("dag_vars", &self.dag_vars),
            ("dag_output", &self.dag_output),
            ("reference_tac", &self.reference_tac),
            ("reference_dag", &self.reference_dag),
        ]
    }
}

/// Absolute locations of every pipeline and reference file for one base
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Token table.
    pub lexer_output: PathBuf,
    /// Tree text.
    pub ast_output: PathBuf,
    /// Three-address code.
    pub tac_output: PathBuf,
    /// DAG variable list.
    pub dag_vars: PathBuf,
    /// Graph description.
    pub dag_output: PathBuf,
    /// Reference three-address code.
    pub reference_tac: PathBuf,
    /// Reference graph description.
    pub reference_dag: PathBuf,
}

impl ArtifactPaths {
    /// Files written by the stages of a run, in stage order.
    #[must_use]
    pub fn pipeline_outputs(&self) -> [&Path; 5] {
        [
            &self.lexer_output,
            &self.ast_output,
            &self.tac_output,
            &self.dag_vars,
            &self.dag_output,
        ]
    }

    /// Files that are only ever read.
    #[must_use]
    pub fn references(&self) -> [&Path; 2] {
        [&self.reference_tac, &self.reference_dag]
    }
}
