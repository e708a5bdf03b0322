//! Presentation adapter.
//!
//! Turns a finished [`PipelineRun`](crate::pipeline::PipelineRun) into
//! display-ready views and writes them through a [`Renderer`].

mod model;
mod render;

pub use model::{
    PresentationModel, TokenLine, DAG_TRAILER, MALFORMED_LEXER_OUTPUT, NO_AST, NO_DAG,
    NO_LEXER_OUTPUT, NO_TAC, NO_TOKENS_FOUND,
};
pub use render::{Renderer, TextRenderer};
