//! Error types for the toolflow orchestrator.
//!
//! Conditions that are part of a normal run (a tool exiting non-zero, a
//! missing output file) are never errors here: they become diagnostics on the
//! [`PipelineRun`](crate::pipeline::PipelineRun). The types in this module
//! cover failures of the orchestrator itself and the typed results of the
//! process and file seams.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for toolflow operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The stage chain violates the strict ordering contract.
    #[error("{0}")]
    InvalidChain(#[from] ChainValidationError),

    /// The configuration is unusable.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A run is already in flight for this session.
    #[error("A pipeline run is already in progress")]
    RunInProgress,

    /// The background task ended without delivering a result.
    #[error("Background run failed: {0}")]
    TaskFailed(String),
}

impl PipelineError {
    /// Returns structured error info for display, when available.
    #[must_use]
    pub fn error_info(&self) -> Option<ErrorInfo> {
        match self {
            Self::InvalidChain(err) => Some(err.error_info.clone()),
            Self::RunInProgress => Some(
                ErrorInfo::new("RUN-001-IN-FLIGHT", "A run is already in progress")
                    .with_fix_hint("Wait for the current run to be delivered before starting another."),
            ),
            _ => None,
        }
    }
}

/// Metadata about an error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "CHAIN-001-ORDER").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Raised when a stage consumes a file that no earlier stage produces.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' consumes '{}' which is neither the run input nor an earlier stage output", path.display())]
pub struct ChainValidationError {
    /// The offending stage.
    pub stage: String,
    /// The unsatisfied input.
    pub path: PathBuf,
    /// Structured error info.
    pub error_info: ErrorInfo,
}

impl ChainValidationError {
    /// Creates a new chain validation error.
    #[must_use]
    pub fn new(stage: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let stage = stage.into();
        let path = path.into();
        let info = ErrorInfo::new(
            "CHAIN-001-ORDER",
            format!("Stage '{stage}' depends on a file produced later or never"),
        )
        .with_fix_hint("Reorder the stages so every input is produced by an earlier stage.")
        .with_context_entry("path", path.display().to_string());

        Self {
            stage,
            path,
            error_info: info,
        }
    }
}

/// Errors raised by [`PipelineConfig::validate`](crate::config::PipelineConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A file name in the layout is empty.
    #[error("File name for '{role}' must not be empty")]
    EmptyFileName {
        /// The file role (e.g. "lexer_output").
        role: &'static str,
    },

    /// Two roles share one file name.
    #[error("File name '{name}' is used for more than one role")]
    DuplicateFileName {
        /// The shared file name.
        name: String,
    },

    /// The stage timeout is not positive or does not fit in a `Duration`.
    #[error("Stage timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(String),
}

/// Errors at the process invocation seam.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The executable could not be started.
    #[error("Failed to launch '{}': {source}", program.display())]
    Launch {
        /// The program path.
        program: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit within the allowed time and was killed.
    #[error("'{}' did not finish within {timeout_secs}s", program.display())]
    TimedOut {
        /// The program path.
        program: PathBuf,
        /// The timeout that elapsed.
        timeout_secs: f64,
    },
}

impl InvokeError {
    /// Creates a launch error.
    #[must_use]
    pub fn launch(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timed_out(program: impl Into<PathBuf>, timeout_secs: f64) -> Self {
        Self::TimedOut {
            program: program.into(),
            timeout_secs,
        }
    }
}

/// Errors from reading a result file.
#[derive(Debug, Error)]
pub enum SlotReadError {
    /// The file does not exist.
    #[error("File '{}' not found", path.display())]
    Missing {
        /// The file path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Could not read '{}': {source}", path.display())]
    Unreadable {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8.
    #[error("File '{}' is not valid UTF-8", path.display())]
    InvalidUtf8 {
        /// The file path.
        path: PathBuf,
    },
}

impl SlotReadError {
    /// Returns the path that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Missing { path } | Self::Unreadable { path, .. } | Self::InvalidUtf8 { path } => {
                path
            }
        }
    }

    /// Returns true if the file was absent rather than unreadable.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_creation() {
        let info = ErrorInfo::new("TEST-001", "Test error")
            .with_fix_hint("Fix this by doing that")
            .with_context_entry("stage", "Lexer");

        assert_eq!(info.code, "TEST-001");
        assert_eq!(info.summary, "Test error");
        assert_eq!(info.fix_hint, Some("Fix this by doing that".to_string()));
        assert_eq!(info.context.get("stage"), Some(&"Lexer".to_string()));
    }

    #[test]
    fn test_chain_validation_error() {
        let err = ChainValidationError::new("DAG Builder", "/tmp/dag_vars.txt");

        assert!(err.to_string().contains("DAG Builder"));
        assert!(err.to_string().contains("dag_vars.txt"));
        assert_eq!(err.error_info.code, "CHAIN-001-ORDER");
    }

    #[test]
    fn test_run_in_progress_info() {
        let err = PipelineError::RunInProgress;
        let info = err.error_info().unwrap();
        assert_eq!(info.code, "RUN-001-IN-FLIGHT");
        assert!(info.fix_hint.is_some());
    }

    #[test]
    fn test_invoke_error_display() {
        let err = InvokeError::timed_out("/opt/tools/lexical", 2.5);
        assert_eq!(err.to_string(), "'/opt/tools/lexical' did not finish within 2.5s");

        let err = InvokeError::launch(
            "/opt/tools/lexical",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("Failed to launch"));
    }

    #[test]
    fn test_slot_read_error_path() {
        let err = SlotReadError::Missing {
            path: PathBuf::from("dag1.dot"),
        };
        assert!(err.is_missing());
        assert_eq!(err.path(), std::path::Path::new("dag1.dot"));

        let err = SlotReadError::InvalidUtf8 {
            path: PathBuf::from("ast_output.txt"),
        };
        assert!(!err.is_missing());
    }
}
