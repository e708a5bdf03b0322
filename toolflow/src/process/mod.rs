//! Process invocation seam.
//!
//! Stages never spawn processes directly; they go through a
//! [`ProcessInvoker`]. Production code uses [`SystemInvoker`], tests swap in
//! scripted or mocked invokers.

use crate::errors::InvokeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Everything needed to launch one stage tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable path.
    pub program: PathBuf,
    /// Positional file arguments.
    pub args: Vec<PathBuf>,
    /// Working directory.
    pub cwd: PathBuf,
    /// Upper bound on wall-clock time.
    pub timeout: Option<Duration>,
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Exit code; `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Decoded standard output.
    pub stdout: String,
    /// Decoded standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Creates an output with the given exit code and no captured text.
    #[must_use]
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
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

    /// Returns true if the process exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launches a stage tool and waits for it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    /// Runs `invocation` to completion.
    ///
    /// A non-zero exit is a successful invocation; only launch failures and
    /// timeouts are errors.
    async fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, InvokeError>;
}

/// Invoker backed by real operating-system processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInvoker;

#[async_trait]
impl ProcessInvoker for SystemInvoker {
    async fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, InvokeError> {
        let program = &invocation.program;
        debug!(
            program = %program.display(),
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "Spawning stage process"
        );

        let child = Command::new(program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| InvokeError::launch(program, e))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let wait = child.wait_with_output();
        let output = match invocation.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| InvokeError::timed_out(program, limit.as_secs_f64()))?,
            None => wait.await,
        }
        .map_err(|e| InvokeError::launch(program, e))?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Option<Duration>) -> Invocation {
        Invocation {
            program: PathBuf::from("/bin/sh"),
            args: vec![PathBuf::from("-c"), PathBuf::from(script)],
            cwd: std::env::temp_dir(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let output = SystemInvoker
            .invoke(&sh("echo out; echo err >&2; exit 3", None))
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut invocation = sh("pwd", None);
        invocation.cwd = dir.path().to_path_buf();

        let output = SystemInvoker.invoke(&invocation).await.unwrap();
        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let err = SystemInvoker
            .invoke(&sh("sleep 5", Some(Duration::from_millis(100))))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let invocation = Invocation {
            program: PathBuf::from("/definitely/not/here/lexical"),
            args: Vec::new(),
            cwd: std::env::temp_dir(),
            timeout: None,
        };
        let err = SystemInvoker.invoke(&invocation).await.unwrap_err();
        assert!(matches!(err, InvokeError::Launch { .. }));
    }

    #[test]
    fn test_process_output_builders() {
        let output = ProcessOutput::exited(0).with_stdout("ok").with_stderr("warn");
        assert!(output.success());
        assert_eq!(output.stdout, "ok");
        assert_eq!(output.stderr, "warn");
    }
}
