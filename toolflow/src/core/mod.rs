//! Core domain model types for toolflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage and run status enums
//! - The per-stage outcome record
//! - Run diagnostics

mod diagnostic;
mod outcome;
mod status;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use outcome::StageOutcome;
pub use status::{FailureKind, RunStatus, StageStatus};
