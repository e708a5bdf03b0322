//! Pipeline description and execution.
//!
//! This module provides:
//! - The fixed stage descriptor set and its ordering check
//! - Pre-run cleanup of stale outputs
//! - The sequential fail-fast runner
//! - Single-flight background sessions

mod cleanup;
mod run;
mod runner;
mod session;
mod stages;


pub use cleanup::{remove_pipeline_outputs, CleanupReport};
pub use run::PipelineRun;
pub use runner::{load_reference_bundle, PipelineRunner};
pub use session::{PipelineSession, RunHandle};
pub use stages::{build_stages, validate_chain, StageDescriptor};
