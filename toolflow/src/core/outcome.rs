//! Per-stage outcome record.

use super::{FailureKind, StageStatus};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The record of one attempted stage.
///
/// Created once when the stage finishes (or is refused at pre-check) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Stage display name.
    pub stage: String,
    /// How the stage ended.
    pub status: StageStatus,
    /// Process exit code; `None` if the process never ran or was signalled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Captured standard output.
    #[serde(default)]
    pub stdout: String,
    /// Captured standard error.
    #[serde(default)]
    pub stderr: String,
    /// Inputs absent at pre-check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_inputs: Vec<PathBuf>,
    /// Outputs absent at post-check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_outputs: Vec<PathBuf>,
    /// Wall-clock time spent in the stage.
    pub duration_ms: f64,
}

impl StageOutcome {
    /// A stage refused at pre-check.
    #[must_use]
    pub fn input_missing(stage: impl Into<String>, missing: Vec<PathBuf>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::InputMissing,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            missing_inputs: missing,
            missing_outputs: Vec::new(),
            duration_ms: 0.0,
        }
    }

    /// Returns true if the stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Maps a failed outcome to the reason reported on the run status.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.status {
            StageStatus::Succeeded => None,
            StageStatus::InputMissing => Some(FailureKind::InputMissing),
            StageStatus::ProcessFailed => Some(FailureKind::ProcessFailed {
                exit_code: self.exit_code,
            }),
            StageStatus::OutputMissing => Some(FailureKind::OutputMissing),
            StageStatus::TimedOut => Some(FailureKind::TimedOut),
            StageStatus::LaunchFailed => Some(FailureKind::LaunchFailed),
        }
    }
}
