//! The result record of one pipeline run.

use crate::bundle::ResultBundle;
use crate::core::{Diagnostic, DiagnosticKind, RunStatus, StageOutcome};
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Everything one run produced.
///
/// Built by the runner and handed over whole; the receiver owns it until it
/// is replaced by the next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique run id.
    pub run_id: Uuid,
    /// The source file the run was started on.
    pub input: PathBuf,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the run finished.
    pub finished_at: Timestamp,
    /// One record per attempted stage, in order.
    pub outcomes: Vec<StageOutcome>,
    /// Everything worth telling the user, in the order it happened.
    pub diagnostics: Vec<Diagnostic>,
    /// Contents captured from this run's outputs.
    pub pipeline: ResultBundle,
    /// Contents of the pre-existing reference files.
    pub reference: ResultBundle,
    /// Terminal state.
    pub status: RunStatus,
}

impl PipelineRun {
    /// Starts an empty record; status is provisional until the runner finishes it.
    pub(crate) fn begin(input: &Path) -> Self {
        let now = now_utc();
        Self {
            run_id: generate_uuid(),
            input: input.to_path_buf(),
            started_at: now,
            finished_at: now,
            outcomes: Vec::new(),
            diagnostics: Vec::new(),
            pipeline: ResultBundle::new(),
            reference: ResultBundle::new(),
            status: RunStatus::Complete,
        }
    }

    /// Returns true if all four stages succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Returns the outcome recorded for `stage`, if it was attempted.
    #[must_use]
    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    /// Names of the attempted stages, in order.
    #[must_use]
    pub fn attempted_stages(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.stage.as_str()).collect()
    }

    /// Diagnostics of one kind, in run order.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Returns true if any diagnostic is fatal.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.kind.is_fatal())
    }

    /// Wall-clock duration of the run in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// One-line summary for a status bar.
    #[must_use]
    pub fn status_line(&self) -> String {
        let input = self
            .input
            .file_name()
            .map_or_else(|| self.input.display().to_string(), |n| n.to_string_lossy().into_owned());
        match &self.status {
            RunStatus::Complete => format!("Pipeline finished for: {input}"),
            RunStatus::PartiallyComplete { stopped_at, .. } => {
                format!("Pipeline finished for: {input} (with errors during '{stopped_at}')")
            }
            RunStatus::ToolingUnavailable { .. } => {
                "Error: Missing executables. Pipeline not run.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FailureKind;

    #[test]
    fn test_begin_is_empty() {
        let run = PipelineRun::begin(Path::new("/src/main.cpp"));
        assert!(run.outcomes.is_empty());
        assert!(run.diagnostics.is_empty());
        assert!(run.pipeline.is_empty());
        assert!(run.reference.is_empty());
        assert_eq!(run.duration_ms(), 0);
    }

    #[test]
    fn test_status_line() {
        let mut run = PipelineRun::begin(Path::new("/src/main.cpp"));
        assert_eq!(run.status_line(), "Pipeline finished for: main.cpp");

        run.status = RunStatus::PartiallyComplete {
            stopped_at: "Syntax Analyzer".to_string(),
            reason: FailureKind::ProcessFailed { exit_code: Some(1) },
        };
        assert_eq!(
            run.status_line(),
            "Pipeline finished for: main.cpp (with errors during 'Syntax Analyzer')"
        );

        run.status = RunStatus::ToolingUnavailable {
            missing: vec!["Lexer".to_string()],
        };
        assert!(run.status_line().starts_with("Error: Missing executables"));
    }

    #[test]
    fn test_serializes_to_json() {
        let run = PipelineRun::begin(Path::new("main.cpp"));
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["status"]["state"], "complete");
        assert_eq!(json["input"], "main.cpp");
        assert!(json["run_id"].is_string());
    }
}
