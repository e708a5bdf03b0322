//! View model derived from a finished run.

use crate::bundle::{ResultBundle, ResultSlot, SlotValue, TokenRow, TokenTable, TokenTableState};
use crate::config::FileLayout;
use crate::core::RunStatus;
use crate::pipeline::PipelineRun;
use serde::{Deserialize, Serialize};

/// Shown when the lexer slot is absent or empty.
pub const NO_LEXER_OUTPUT: &str = "(No Lexer Output)";
/// Shown when the lexer output is shorter than its header.
pub const MALFORMED_LEXER_OUTPUT: &str = "(Malformed Lexer Output)";
/// Shown when the lexer output has a header but no rows.
pub const NO_TOKENS_FOUND: &str = "(No Tokens Found)";
/// Shown when the syntax tree slot is absent or empty.
pub const NO_AST: &str = "(No AST generated or file empty)";
/// Shown when the reference three-address code is absent or empty.
pub const NO_TAC: &str = "(No 3AC content found in display file)";
/// Shown when the reference graph is absent or empty.
pub const NO_DAG: &str = "(No DAG .dot content found in display file)";
/// Appended to a non-empty graph view.
pub const DAG_TRAILER: &str = "\n\n# --- End of DOT Source ---\n\
# Copy this content and use a Graphviz tool to visualize the DAG.";

/// One row of the token view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLine {
    /// Token number, `?` for a parse error, empty for a placeholder.
    pub index: String,
    /// Token category or placeholder text.
    pub kind: String,
    /// Lexeme, or the raw line for a parse error.
    pub lexeme: String,
}

impl TokenLine {
    fn placeholder(text: &str) -> Self {
        Self {
            index: String::new(),
            kind: text.to_string(),
            lexeme: String::new(),
        }
    }
}

impl From<&TokenRow> for TokenLine {
    fn from(row: &TokenRow) -> Self {
        match row {
            TokenRow::Token {
                index,
                kind,
                lexeme,
            } => Self {
                index: index.clone(),
                kind: kind.clone(),
                lexeme: lexeme.clone(),
            },
            TokenRow::ParseError { line } => Self {
                index: "?".to_string(),
                kind: "Parse Error".to_string(),
                lexeme: line.clone(),
            },
        }
    }
}

/// Everything a front end shows after a run.
///
/// Token and tree views come from the pipeline bundle; the three-address
/// code and graph views come from the reference bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationModel {
    /// Status bar text.
    pub status: String,
    /// Token view rows.
    pub tokens: Vec<TokenLine>,
    /// Syntax tree view.
    pub ast: String,
    /// Three-address code view.
    pub tac: String,
    /// Graph view.
    pub dag: String,
    /// Diagnostics log, one entry per line group, in run order.
    pub log: Vec<String>,
    /// Files a run writes.
    pub generated_files: Vec<String>,
    /// Files the TAC and DAG views are read from.
    pub displayed_files: Vec<String>,
}

impl Default for PresentationModel {
    fn default() -> Self {
        Self::cleared()
    }
}

impl PresentationModel {
    /// The empty state shown before the first run or after a clear.
    #[must_use]
    pub fn cleared() -> Self {
        Self {
            status: "Results cleared. Ready.".to_string(),
            tokens: Vec::new(),
            ast: String::new(),
            tac: String::new(),
            dag: String::new(),
            log: Vec::new(),
            generated_files: Vec::new(),
            displayed_files: Vec::new(),
        }
    }

    /// Builds every view from `run`. `files` names the files listed in the log.
    #[must_use]
    pub fn from_run(run: &PipelineRun, files: &FileLayout) -> Self {
        let mut log = vec!["--- Pipeline Execution Finished ---".to_string()];
        log.extend(run.diagnostics.iter().map(ToString::to_string));

        let status = match run.status {
            RunStatus::ToolingUnavailable { .. } => run.status_line(),
            _ => format!("{} (Displaying reference 3AC/DAG)", run.status_line()),
        };

        let generated_files = vec![
            files.lexer_output.clone(),
            files.ast_output.clone(),
            files.tac_output.clone(),
            files.dag_vars.clone(),
            files.dag_output.clone(),
        ];
        let displayed_files = vec![files.reference_tac.clone(), files.reference_dag.clone()];

        if !matches!(run.status, RunStatus::ToolingUnavailable { .. }) {
            log.push("Pipeline generated:".to_string());
            log.extend(generated_files.iter().map(|f| format!("- {f}")));
            log.push("Displaying content from:".to_string());
            log.extend(displayed_files.iter().map(|f| format!("- {f}")));
        }

        Self {
            status,
            tokens: token_view(run.pipeline.get(ResultSlot::Tokens)),
            ast: text_view(&run.pipeline, ResultSlot::Ast, NO_AST),
            tac: text_view(&run.reference, ResultSlot::Tac, NO_TAC),
            dag: dag_view(&run.reference),
            log,
            generated_files,
            displayed_files,
        }
    }
}

fn non_empty(value: Option<&SlotValue>) -> Option<&str> {
    value.map(SlotValue::display_text).filter(|text| !text.is_empty())
}

fn token_view(value: Option<&SlotValue>) -> Vec<TokenLine> {
    let text = match value {
        Some(SlotValue::Unavailable { marker }) => return vec![TokenLine::placeholder(marker)],
        Some(SlotValue::Loaded(text)) => text.as_str(),
        None => "",
    };

    let table = TokenTable::parse(text);
    match table.state {
        TokenTableState::Empty => vec![TokenLine::placeholder(NO_LEXER_OUTPUT)],
        TokenTableState::Malformed => vec![TokenLine::placeholder(MALFORMED_LEXER_OUTPUT)],
        TokenTableState::NoTokens => vec![TokenLine::placeholder(NO_TOKENS_FOUND)],
        TokenTableState::Rows => table.rows.iter().map(TokenLine::from).collect(),
    }
}

fn text_view(bundle: &ResultBundle, slot: ResultSlot, placeholder: &str) -> String {
    non_empty(bundle.get(slot)).unwrap_or(placeholder).to_string()
}

fn dag_view(bundle: &ResultBundle) -> String {
    match non_empty(bundle.get(ResultSlot::Dag)) {
        Some(text) => format!("{text}{DAG_TRAILER}"),
        None => NO_DAG.to_string(),
    }
}
