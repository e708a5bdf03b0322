//! Run diagnostics.
//!
//! Every notable condition of a run, fatal or not, becomes exactly one
//! [`Diagnostic`] appended in the order it happened. The presentation layer
//! shows them as a flat log.

use crate::errors::{InvokeError, SlotReadError};
use crate::tools::MissingTool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A tool executable is absent; the run never starts.
    ToolingMissing,
    /// A stale pipeline file could not be deleted before the run.
    CleanupFailed,
    /// Exit code and captured output of an invoked stage.
    StageReport,
    /// A stage's required input was absent.
    StageInputMissing,
    /// A stage exited non-zero.
    StageProcessFailed,
    /// A stage exited zero without writing its outputs.
    StageOutputMissing,
    /// A stage exceeded its timeout.
    StageTimedOut,
    /// A stage's executable could not be started.
    StageLaunchFailed,
    /// A result file existed but could not be read or decoded.
    ResultReadFailed,
    /// A reference display file is absent.
    ReferenceFileMissing,
}

impl DiagnosticKind {
    /// Returns true for kinds that stop the stage sequence.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ToolingMissing
                | Self::StageInputMissing
                | Self::StageProcessFailed
                | Self::StageOutputMissing
                | Self::StageTimedOut
                | Self::StageLaunchFailed
        )
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Info,
    /// Degraded but not fatal.
    Warning,
    /// Stopped the pipeline or lost a result.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One entry in a run's diagnostics log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// How bad it is.
    pub severity: Severity,
    /// Stage display name, when the diagnostic belongs to a stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Files involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathBuf>,
    /// Process exit code, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Human-readable message.
    pub message: String,
}

fn file_names(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| file_name(p)).collect::<Vec<_>>().join(", ")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            stage: None,
            paths: Vec::new(),
            exit_code: None,
            message: message.into(),
        }
    }

    fn for_stage(mut self, stage: &str) -> Self {
        self.stage = Some(stage.to_string());
        self
    }

    fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// A tool executable is missing.
    #[must_use]
    pub fn tooling_missing(missing: &MissingTool) -> Self {
        Self::new(DiagnosticKind::ToolingMissing, Severity::Error, missing.to_string())
            .for_stage(missing.kind.display_name())
            .with_paths(vec![missing.path.clone()])
    }

    /// A stale file could not be deleted.
    #[must_use]
    pub fn cleanup_failed(path: &Path, error: &std::io::Error) -> Self {
        Self::new(
            DiagnosticKind::CleanupFailed,
            Severity::Warning,
            format!("Warning: Could not delete '{}': {error}", file_name(path)),
        )
        .with_paths(vec![path.to_path_buf()])
    }

    /// Exit status and captured output of an invoked stage.
    ///
    /// Standard error is kept even on success since tools print warnings there.
    #[must_use]
    pub fn stage_report(stage: &str, exit_code: Option<i32>, stdout: &str, stderr: &str) -> Self {
        let status = exit_code.map_or_else(|| "was terminated by a signal".to_string(), |c| {
            format!("exited with code {c}")
        });
        let mut message = format!("{stage} {status}");
        let stdout = stdout.trim();
        let stderr = stderr.trim();
        if !stdout.is_empty() {
            message.push_str(&format!("\n--- {stage} Output ---\n{stdout}"));
        }
        if !stderr.is_empty() {
            message.push_str(&format!("\n--- {stage} Errors ---\n{stderr}"));
        }

        let severity = if stderr.is_empty() {
            Severity::Info
        } else {
            Severity::Warning
        };
        let mut diagnostic = Self::new(DiagnosticKind::StageReport, severity, message).for_stage(stage);
        diagnostic.exit_code = exit_code;
        diagnostic
    }

    /// Required inputs were absent before launch.
    #[must_use]
    pub fn input_missing(stage: &str, missing: Vec<PathBuf>) -> Self {
        Self::new(
            DiagnosticKind::StageInputMissing,
            Severity::Error,
            format!("Input file(s) for '{stage}' not found: {}.", file_names(&missing)),
        )
        .for_stage(stage)
        .with_paths(missing)
    }

    /// The stage exited unsuccessfully.
    #[must_use]
    pub fn process_failed(stage: &str, exit_code: Option<i32>) -> Self {
        let detail = exit_code.map_or_else(|| "terminated by signal".to_string(), |c| {
            format!("Exit Code: {c}")
        });
        let mut diagnostic = Self::new(
            DiagnosticKind::StageProcessFailed,
            Severity::Error,
            format!("Error: {stage} failed ({detail})"),
        )
        .for_stage(stage);
        diagnostic.exit_code = exit_code;
        diagnostic
    }

    /// The stage exited zero but outputs are missing.
    #[must_use]
    pub fn output_missing(stage: &str, missing: Vec<PathBuf>) -> Self {
        Self::new(
            DiagnosticKind::StageOutputMissing,
            Severity::Error,
            format!(
                "Error: Pipeline output file(s) not found after {stage}: {}",
                file_names(&missing)
            ),
        )
        .for_stage(stage)
        .with_paths(missing)
    }

    /// The process seam refused or aborted the invocation.
    #[must_use]
    pub fn invoke_failed(stage: &str, error: &InvokeError) -> Self {
        let (kind, program) = match error {
            InvokeError::Launch { program, .. } => (DiagnosticKind::StageLaunchFailed, program),
            InvokeError::TimedOut { program, .. } => (DiagnosticKind::StageTimedOut, program),
        };
        Self::new(kind, Severity::Error, format!("Error: {stage}: {error}"))
            .for_stage(stage)
            .with_paths(vec![program.clone()])
    }

    /// A produced result file could not be read.
    #[must_use]
    pub fn result_read_failed(stage: &str, error: &SlotReadError) -> Self {
        Self::new(
            DiagnosticKind::ResultReadFailed,
            Severity::Error,
            format!(
                "Error reading {stage} output '{}': {error}",
                file_name(error.path())
            ),
        )
        .for_stage(stage)
        .with_paths(vec![error.path().to_path_buf()])
    }

    /// A reference display file could not be loaded.
    ///
    /// Absence maps to [`DiagnosticKind::ReferenceFileMissing`]; any other
    /// read failure to [`DiagnosticKind::ResultReadFailed`].
    #[must_use]
    pub fn reference_unavailable(error: &SlotReadError) -> Self {
        let name = file_name(error.path());
        let (kind, message) = if error.is_missing() {
            (
                DiagnosticKind::ReferenceFileMissing,
                format!("Warning: Display file '{name}' not found."),
            )
        } else {
            (
                DiagnosticKind::ResultReadFailed,
                format!("Error reading display file '{name}': {error}"),
            )
        };
        Self::new(kind, Severity::Warning, message).with_paths(vec![error.path().to_path_buf()])
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;

    #[test]
    fn test_stage_report_keeps_stderr_on_success() {
        let diagnostic = Diagnostic::stage_report("Lexer", Some(0), "done\n", "Warning: odd char\n");
        assert_eq!(diagnostic.kind, DiagnosticKind::StageReport);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.exit_code, Some(0));
        assert!(diagnostic.message.starts_with("Lexer exited with code 0"));
        assert!(diagnostic.message.contains("--- Lexer Output ---\ndone"));
        assert!(diagnostic.message.contains("--- Lexer Errors ---\nWarning: odd char"));
    }

    #[test]
    fn test_stage_report_quiet_tool() {
        let diagnostic = Diagnostic::stage_report("DAG Builder", Some(0), "", "  ");
        assert_eq!(diagnostic.severity, Severity::Info);
        assert_eq!(diagnostic.message, "DAG Builder exited with code 0");
    }

    #[test]
    fn test_process_failed_names_stage_and_code() {
        let diagnostic = Diagnostic::process_failed("Syntax Analyzer", Some(3));
        assert_eq!(diagnostic.stage.as_deref(), Some("Syntax Analyzer"));
        assert_eq!(diagnostic.exit_code, Some(3));
        assert_eq!(diagnostic.message, "Error: Syntax Analyzer failed (Exit Code: 3)");
        assert!(diagnostic.kind.is_fatal());
    }

    #[test]
    fn test_input_missing_lists_file_names() {
        let diagnostic = Diagnostic::input_missing(
            "DAG Builder",
            vec![PathBuf::from("/w/3ac_output.txt"), PathBuf::from("/w/dag_vars.txt")],
        );
        assert_eq!(
            diagnostic.message,
            "Input file(s) for 'DAG Builder' not found: 3ac_output.txt, dag_vars.txt."
        );
        assert_eq!(diagnostic.paths.len(), 2);
    }

    #[test]
    fn test_reference_unavailable_kinds() {
        let missing = SlotReadError::Missing {
            path: PathBuf::from("/w/dag1.dot"),
        };
        let diagnostic = Diagnostic::reference_unavailable(&missing);
        assert_eq!(diagnostic.kind, DiagnosticKind::ReferenceFileMissing);
        assert!(!diagnostic.kind.is_fatal());

        let garbled = SlotReadError::InvalidUtf8 {
            path: PathBuf::from("/w/dag1.dot"),
        };
        let diagnostic = Diagnostic::reference_unavailable(&garbled);
        assert_eq!(diagnostic.kind, DiagnosticKind::ResultReadFailed);
    }

    #[test]
    fn test_invoke_failed_kinds() {
        let timeout = InvokeError::timed_out("/w/lexical", 1.0);
        assert_eq!(
            Diagnostic::invoke_failed("Lexer", &timeout).kind,
            DiagnosticKind::StageTimedOut
        );

        let launch = InvokeError::launch(
            "/w/lexical",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(
            Diagnostic::invoke_failed("Lexer", &launch).kind,
            DiagnosticKind::StageLaunchFailed
        );
    }

    #[test]
    fn test_tooling_missing() {
        let diagnostic = Diagnostic::tooling_missing(&MissingTool {
            kind: ToolKind::Lexer,
            path: PathBuf::from("/w/lexical"),
        });
        assert_eq!(diagnostic.kind, DiagnosticKind::ToolingMissing);
        assert_eq!(diagnostic.to_string(), "- Lexer executable ('lexical') not found.");
    }
}
