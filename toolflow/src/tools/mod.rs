//! Toolchain registry.
//!
//! This module provides:
//! - The closed set of pipeline tools
//! - Path resolution and existence checks for their executables

mod kind;
mod registry;

pub use kind::ToolKind;
pub use registry::{MissingTool, ToolRef, ToolchainRegistry};
