//! Test assertions for pipeline runs.

use crate::bundle::{ResultBundle, ResultSlot};
use crate::core::DiagnosticKind;
use crate::pipeline::PipelineRun;

/// Asserts that every stage succeeded.
pub fn assert_run_complete(run: &PipelineRun) {
    assert!(
        run.is_complete(),
        "Expected a complete run, got {} with diagnostics: {:#?}",
        run.status,
        run.diagnostics
    );
}

/// Asserts that the run stopped at `stage`.
pub fn assert_stopped_at(run: &PipelineRun, stage: &str) {
    assert_eq!(
        run.status.stopped_at(),
        Some(stage),
        "Expected the run to stop at '{stage}', got {}",
        run.status
    );
}

/// Asserts that exactly `expected` diagnostics of `kind` were recorded.
pub fn assert_diagnostic_count(run: &PipelineRun, kind: DiagnosticKind, expected: usize) {
    let actual = run.diagnostics_of(kind).count();
    assert_eq!(
        actual, expected,
        "Expected {expected} {kind:?} diagnostic(s), got {actual}: {:#?}",
        run.diagnostics
    );
}

/// Asserts that `slot` holds loaded text.
pub fn assert_slot_loaded(bundle: &ResultBundle, slot: ResultSlot) {
    assert!(
        bundle.is_loaded(slot),
        "Expected slot {slot} to be loaded, got {:?}",
        bundle.get(slot)
    );
}

/// Asserts that `slot` holds the unavailable marker for `file_name`.
pub fn assert_slot_unavailable(bundle: &ResultBundle, slot: ResultSlot, file_name: &str) {
    let expected = format!("ERROR READING {file_name}");
    assert_eq!(
        bundle.get(slot).map(|v| v.display_text().to_string()),
        Some(expected),
        "Expected slot {slot} to hold the unavailable marker"
    );
    assert!(!bundle.is_loaded(slot));
}
