//! Scratch toolchain directories for tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ArtifactPaths, PipelineConfig};
use crate::errors::PipelineError;
use crate::pipeline::PipelineRunner;
use crate::process::ProcessInvoker;
use crate::tools::ToolKind;

/// Source text written as the run input.
pub const SAMPLE_SOURCE: &str = "int main() {\n    int a = b + c;\n    return a;\n}\n";

/// Token table in the lexer's output format.
pub const SAMPLE_TOKENS: &str = "Token Num | Type | Lexeme\n\
--------------------------------------------------\n\
1 | KEYWORD | int\n\
2 | ID | main\n\
3 | ID | a\n";

/// Tree text as the syntax analyzer writes it.
pub const SAMPLE_AST: &str = "Program\n  FunctionDecl main\n    Return a\n";

/// Three-address code.
pub const SAMPLE_TAC: &str = "t1 = b + c\na = t1\nreturn a\n";

/// DAG variable list.
pub const SAMPLE_DAG_VARS: &str = "a\nb\nc\nt1\n";

/// Graph description.
pub const SAMPLE_DAG: &str = "digraph DAG {\n  n0 [label=\"+\"];\n}\n";

/// Reference three-address code shown in the TAC view.
pub const REFERENCE_TAC: &str = "t1 = b + c\na = t1\n";

/// Reference graph description shown in the DAG view.
pub const REFERENCE_DAG: &str = "digraph DAG {\n  n0 [label=\"+ t1\"];\n}\n";

/// A base directory laid out like an installed toolchain: four placeholder
/// executables, an input file and both reference files.
#[derive(Debug, Clone)]
pub struct Workspace {
    config: PipelineConfig,
    input: PathBuf,
}

impl Workspace {
    /// Populates `root` and returns the workspace.
    ///
    /// # Errors
    ///
    /// Returns any IO error from writing the files.
    pub fn create(root: &Path) -> io::Result<Self> {
        let config = PipelineConfig::new(root);
        for kind in ToolKind::ALL {
            std::fs::write(root.join(config.tools.file_name(kind)), "")?;
        }
        let input = root.join("main.cpp");
        std::fs::write(&input, SAMPLE_SOURCE)?;

        let paths = config.artifact_paths();
        std::fs::write(&paths.reference_tac, REFERENCE_TAC)?;
        std::fs::write(&paths.reference_dag, REFERENCE_DAG)?;

        Ok(Self { config, input })
    }

    /// Returns the configuration for this workspace.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the input file.
    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Returns every pipeline and reference path.
    #[must_use]
    pub fn paths(&self) -> ArtifactPaths {
        self.config.artifact_paths()
    }

    /// Returns where the executable for `kind` lives.
    #[must_use]
    pub fn tool_path(&self, kind: ToolKind) -> PathBuf {
        self.config.base_dir.join(self.config.tools.file_name(kind))
    }

    /// Deletes the executable for `kind`.
    ///
    /// # Errors
    ///
    /// Returns any IO error from the removal.
    pub fn remove_tool(&self, kind: ToolKind) -> io::Result<()> {
        std::fs::remove_file(self.tool_path(kind))
    }

    /// Deletes both reference files.
    ///
    /// # Errors
    ///
    /// Returns any IO error from the removal.
    pub fn remove_references(&self) -> io::Result<()> {
        let paths = self.paths();
        for path in paths.references() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Writes `contents` to every pipeline output, as a previous run would.
    ///
    /// # Errors
    ///
    /// Returns any IO error from writing the files.
    pub fn write_stale_outputs(&self, contents: &str) -> io::Result<()> {
        let paths = self.paths();
        for path in paths.pipeline_outputs() {
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Builds a runner over this workspace using `invoker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn runner(&self, invoker: Arc<dyn ProcessInvoker>) -> Result<PipelineRunner, PipelineError> {
        Ok(PipelineRunner::new(self.config.clone())?.with_invoker(invoker))
    }
}
