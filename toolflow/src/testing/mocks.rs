//! Scripted stand-ins for the external tools.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::errors::InvokeError;
use crate::process::{Invocation, ProcessInvoker, ProcessOutput};
use crate::tools::{ToolKind, ToolchainRegistry};

use super::fixtures::{SAMPLE_AST, SAMPLE_DAG, SAMPLE_DAG_VARS, SAMPLE_TAC, SAMPLE_TOKENS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedFailure {
    Launch,
    Timeout,
}

/// What one emulated tool does when invoked.
#[derive(Debug, Clone, Default)]
pub struct ToolScript {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    writes: Vec<(PathBuf, Vec<u8>)>,
    delay: Option<Duration>,
    failure: Option<ScriptedFailure>,
}

impl ToolScript {
    /// A tool that exits zero.
    #[must_use]
    pub fn succeeds() -> Self {
        Self::exits(0)
    }

    /// A tool that exits with `code`.
    #[must_use]
    pub fn exits(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    /// A tool that runs past its timeout.
    #[must_use]
    pub fn times_out() -> Self {
        Self {
            failure: Some(ScriptedFailure::Timeout),
            ..Self::default()
        }
    }

    /// A tool whose executable cannot be started.
    #[must_use]
    pub fn cannot_launch() -> Self {
        Self {
            failure: Some(ScriptedFailure::Launch),
            ..Self::default()
        }
    }

    /// Writes `contents` to `path` when invoked. Relative paths resolve
    /// against the invocation's working directory.
    #[must_use]
    pub fn writing(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.writes.push((path.into(), contents.into()));
        self
    }

    /// Sets captured standard output.
    #[must_use]
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Sets captured standard error.
    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Sleeps before finishing.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A [`ProcessInvoker`] that emulates each tool with a [`ToolScript`] and
/// records every invocation.
///
/// Programs with no script fail to launch.
#[derive(Debug)]
pub struct ScriptedInvoker {
    programs: HashMap<PathBuf, ToolKind>,
    scripts: Mutex<HashMap<ToolKind, ToolScript>>,
    invocations: Mutex<Vec<(ToolKind, Invocation)>>,
}

impl ScriptedInvoker {
    /// Creates an invoker with no scripts for the tools of `config`.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        let registry = ToolchainRegistry::new(config);
        let programs = ToolKind::ALL
            .iter()
            .map(|kind| (registry.path_for(*kind), *kind))
            .collect();
        Self {
            programs,
            scripts: Mutex::new(HashMap::new()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Creates an invoker where every tool succeeds and writes sample output.
    #[must_use]
    pub fn happy_path(config: &PipelineConfig) -> Self {
        let files = &config.files;
        Self::new(config)
            .on(
                ToolKind::Lexer,
                ToolScript::succeeds()
                    .writing(&files.lexer_output, SAMPLE_TOKENS)
                    .with_stdout("Lexical analysis complete."),
            )
            .on(
                ToolKind::SyntaxAnalyzer,
                ToolScript::succeeds().writing(&files.ast_output, SAMPLE_AST),
            )
            .on(
                ToolKind::IntermediateCodeGen,
                ToolScript::succeeds()
                    .writing(&files.tac_output, SAMPLE_TAC)
                    .writing(&files.dag_vars, SAMPLE_DAG_VARS),
            )
            .on(
                ToolKind::DagBuilder,
                ToolScript::succeeds().writing(&files.dag_output, SAMPLE_DAG),
            )
    }

    /// Sets the script for `kind`.
    #[must_use]
    pub fn on(self, kind: ToolKind, script: ToolScript) -> Self {
        self.set_script(kind, script);
        self
    }

    /// Replaces the script for `kind`.
    pub fn set_script(&self, kind: ToolKind, script: ToolScript) {
        self.scripts.lock().insert(kind, script);
    }

    /// Returns every recorded invocation in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().iter().map(|(_, inv)| inv.clone()).collect()
    }

    /// Returns the invoked tools in order.
    #[must_use]
    pub fn invoked_tools(&self) -> Vec<ToolKind> {
        self.invocations.lock().iter().map(|(kind, _)| *kind).collect()
    }

    /// Returns how many times `kind` was invoked.
    #[must_use]
    pub fn call_count(&self, kind: ToolKind) -> usize {
        self.invocations.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Returns the total number of invocations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Clears recorded invocations.
    pub fn reset(&self) {
        self.invocations.lock().clear();
    }
}

#[async_trait]
impl ProcessInvoker for ScriptedInvoker {
    async fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, InvokeError> {
        let program = &invocation.program;
        let Some(kind) = self.programs.get(program).copied() else {
            return Err(InvokeError::launch(
                program.clone(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        };
        self.invocations.lock().push((kind, invocation.clone()));

        let script = self.scripts.lock().get(&kind).cloned();
        let Some(script) = script else {
            return Err(InvokeError::launch(
                program.clone(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        };

        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }
        match script.failure {
            Some(ScriptedFailure::Launch) => {
                return Err(InvokeError::launch(
                    program.clone(),
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ));
            }
            Some(ScriptedFailure::Timeout) => {
                let secs = invocation.timeout.map_or(0.0, |t| t.as_secs_f64());
                return Err(InvokeError::timed_out(program.clone(), secs));
            }
            None => {}
        }

        for (path, contents) in &script.writes {
            let target = if path.is_absolute() {
                path.clone()
            } else {
                invocation.cwd.join(path)
            };
            tokio::fs::write(&target, contents)
                .await
                .map_err(|e| InvokeError::launch(program.clone(), e))?;
        }

        Ok(ProcessOutput {
            exit_code: script.exit_code,
            stdout: script.stdout,
            stderr: script.stderr,
        })
    }
}
