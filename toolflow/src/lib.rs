//! # Toolflow
//!
//! Orchestration for a fixed four-stage external compiler toolchain:
//! lexer, syntax analyzer, intermediate-code generator and DAG builder.
//! The tools talk to each other only through files in one base directory.
//!
//! Toolflow provides:
//!
//! - **Toolchain registry**: locate the four executables and report missing ones
//! - **Fail-fast runner**: pre-check inputs, run each tool, post-check outputs
//! - **Result bundles**: fresh stage output kept apart from reference content
//! - **Single-flight sessions**: one background run at a time, delivered whole
//! - **Presentation**: display-ready views with fixed placeholders
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toolflow::prelude::*;
//!
//! let runner = PipelineRunner::new(PipelineConfig::new("/opt/toolchain"))?;
//! let session = PipelineSession::new(runner);
//!
//! let run = session.start("main.cpp")?.wait().await?;
//! let model = PresentationModel::from_run(&run, &FileLayout::default());
//! TextRenderer::new(std::io::stdout()).render(&model)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bundle;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod presentation;
pub mod process;
pub mod testing;
pub mod tools;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bundle::{ResultBundle, ResultSlot, SlotValue, TokenRow, TokenTable};
    pub use crate::config::{FileLayout, PipelineConfig, ToolNames};
    pub use crate::core::{
        Diagnostic, DiagnosticKind, FailureKind, RunStatus, Severity, StageOutcome, StageStatus,
    };
    pub use crate::errors::{PipelineError, SlotReadError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{PipelineRun, PipelineRunner, PipelineSession, RunHandle};
    pub use crate::presentation::{PresentationModel, Renderer, TextRenderer};
    pub use crate::process::{ProcessInvoker, SystemInvoker};
    pub use crate::tools::{MissingTool, ToolKind, ToolchainRegistry};
    pub use crate::utils::{generate_uuid, iso_timestamp, Timestamp};
}
