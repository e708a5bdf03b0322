//! Renderers that write a [`PresentationModel`] somewhere.

use super::model::{PresentationModel, TokenLine};
use std::io::{self, Write};

/// Writes a presentation model to an output.
pub trait Renderer {
    /// Renders every view of `model`.
    fn render(&mut self, model: &PresentationModel) -> io::Result<()>;
}

/// Plain-text renderer: one titled section per view.
#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn section(&mut self, title: &str, body: &str) -> io::Result<()> {
        writeln!(self.out, "=== {title} ===")?;
        writeln!(self.out, "{}", body.trim_end())?;
        writeln!(self.out)
    }

    fn token_table(&mut self, rows: &[TokenLine]) -> io::Result<()> {
        let width = |f: fn(&TokenLine) -> &str, header: &str| {
            rows.iter().map(|r| f(r).len()).chain([header.len()]).max().unwrap_or(0)
        };
        let w_index = width(|r| r.index.as_str(), "Token Num");
        let w_kind = width(|r| r.kind.as_str(), "Type");

        writeln!(self.out, "=== Tokens ===")?;
        writeln!(self.out, "{:<w_index$} | {:<w_kind$} | Lexeme", "Token Num", "Type")?;
        writeln!(self.out, "{}", "-".repeat(w_index + w_kind + 12))?;
        for row in rows {
            writeln!(
                self.out,
                "{:<w_index$} | {:<w_kind$} | {}",
                row.index, row.kind, row.lexeme
            )?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, model: &PresentationModel) -> io::Result<()> {
        self.token_table(&model.tokens)?;
        self.section("AST", &model.ast)?;
        self.section("3AC", &model.tac)?;
        self.section("DAG", &model.dag)?;
        self.section("Log", &model.log.join("\n"))?;
        writeln!(self.out, "{}", model.status)?;
        self.out.flush()
    }
}
