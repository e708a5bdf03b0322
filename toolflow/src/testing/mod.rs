//! Testing utilities for toolflow pipelines.
//!
//! This module provides:
//! - A scripted process invoker that emulates the four tools
//! - A scratch toolchain workspace with sample files
//! - Assertions over pipeline runs

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_diagnostic_count, assert_run_complete, assert_slot_loaded, assert_slot_unavailable,
    assert_stopped_at,
};
pub use fixtures::{
    Workspace, REFERENCE_DAG, REFERENCE_TAC, SAMPLE_AST, SAMPLE_DAG, SAMPLE_DAG_VARS,
    SAMPLE_SOURCE, SAMPLE_TAC, SAMPLE_TOKENS,
};
pub use mocks::{ScriptedInvoker, ToolScript};
