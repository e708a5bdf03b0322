//! Stage and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a single stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Exit code zero and every expected output present.
    Succeeded,
    /// A required input was absent; the tool was not launched.
    InputMissing,
    /// The tool exited non-zero or was killed by a signal.
    ProcessFailed,
    /// The tool exited zero but did not write every expected output.
    OutputMissing,
    /// The tool exceeded the stage timeout and was killed.
    TimedOut,
    /// The tool could not be started at all.
    LaunchFailed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::InputMissing => write!(f, "input_missing"),
            Self::ProcessFailed => write!(f, "process_failed"),
            Self::OutputMissing => write!(f, "output_missing"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::LaunchFailed => write!(f, "launch_failed"),
        }
    }
}

impl StageStatus {
    /// Returns true if the stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if the status stops the stage sequence.
    #[must_use]
    pub fn is_hard_failure(&self) -> bool {
        !self.is_success()
    }
}

/// Why a run stopped before the last stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// A required input file was absent.
    InputMissing,
    /// The tool exited unsuccessfully. `None` means killed by a signal.
    ProcessFailed {
        /// The exit code, if the process exited normally.
        exit_code: Option<i32>,
    },
    /// The tool reported success but an output file is missing.
    OutputMissing,
    /// The tool exceeded the stage timeout.
    TimedOut,
    /// The tool could not be launched.
    LaunchFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputMissing => write!(f, "input file missing"),
            Self::ProcessFailed {
                exit_code: Some(code),
            } => write!(f, "exit code {code}"),
            Self::ProcessFailed { exit_code: None } => write!(f, "terminated by signal"),
            Self::OutputMissing => write!(f, "output file missing"),
            Self::TimedOut => write!(f, "timed out"),
            Self::LaunchFailed => write!(f, "could not be launched"),
        }
    }
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// All four stages succeeded.
    Complete,
    /// The stage sequence stopped at `stopped_at`.
    PartiallyComplete {
        /// Display name of the stage that failed.
        stopped_at: String,
        /// What went wrong there.
        reason: FailureKind,
    },
    /// The pre-flight tool check failed; no stage ran.
    ToolingUnavailable {
        /// Display names of the missing tools.
        missing: Vec<String>,
    },
}

impl RunStatus {
    /// Returns true for [`RunStatus::Complete`].
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Returns the stage the run stopped at, if any.
    #[must_use]
    pub fn stopped_at(&self) -> Option<&str> {
        match self {
            Self::PartiallyComplete { stopped_at, .. } => Some(stopped_at),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::PartiallyComplete { stopped_at, reason } => {
                write!(f, "partially complete (stopped at '{stopped_at}': {reason})")
            }
            Self::ToolingUnavailable { missing } => {
                write!(f, "tooling unavailable (missing: {})", missing.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_display() {
        assert_eq!(StageStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(StageStatus::OutputMissing.to_string(), "output_missing");
        assert_eq!(StageStatus::TimedOut.to_string(), "timed_out");
    }

    #[test]
    fn test_stage_status_failure() {
        assert!(StageStatus::Succeeded.is_success());
        assert!(!StageStatus::Succeeded.is_hard_failure());
        assert!(StageStatus::ProcessFailed.is_hard_failure());
        assert!(StageStatus::InputMissing.is_hard_failure());
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(
            FailureKind::ProcessFailed { exit_code: Some(2) }.to_string(),
            "exit code 2"
        );
        assert_eq!(
            FailureKind::ProcessFailed { exit_code: None }.to_string(),
            "terminated by signal"
        );
    }

    #[test]
    fn test_run_status_display() {
        let status = RunStatus::PartiallyComplete {
            stopped_at: "Syntax Analyzer".to_string(),
            reason: FailureKind::ProcessFailed { exit_code: Some(1) },
        };
        assert_eq!(
            status.to_string(),
            "partially complete (stopped at 'Syntax Analyzer': exit code 1)"
        );
        assert_eq!(status.stopped_at(), Some("Syntax Analyzer"));
        assert!(!status.is_complete());
        assert!(RunStatus::Complete.is_complete());
    }

    #[test]
    fn test_run_status_serialize() {
        let json = serde_json::to_value(RunStatus::ToolingUnavailable {
            missing: vec!["Lexer".to_string()],
        })
        .unwrap();
        assert_eq!(json["state"], "tooling_unavailable");
        assert_eq!(json["missing"][0], "Lexer");

        let back: RunStatus = serde_json::from_value(json).unwrap();
        assert!(matches!(back, RunStatus::ToolingUnavailable { .. }));
    }
}
