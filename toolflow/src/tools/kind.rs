//! The four external tools of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed external tools, listed in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Lexical analyzer; turns source text into a token table.
    Lexer,
    /// Syntax analyzer; turns the token table into tree text.
    SyntaxAnalyzer,
    /// Intermediate-code generator; emits three-address code and DAG variables.
    IntermediateCodeGen,
    /// DAG builder; emits a graph description.
    DagBuilder,
}

impl ToolKind {
    /// All tools in pipeline order.
    pub const ALL: [Self; 4] = [
        Self::Lexer,
        Self::SyntaxAnalyzer,
        Self::IntermediateCodeGen,
        Self::DagBuilder,
    ];

    /// Human-readable name used in diagnostics.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Lexer => "Lexer",
            Self::SyntaxAnalyzer => "Syntax Analyzer",
            Self::IntermediateCodeGen => "Intermediate Code Gen",
            Self::DagBuilder => "DAG Builder",
        }
    }

    /// Executable base name used when no override is configured.
    #[must_use]
    pub const fn default_base_name(self) -> &'static str {
        match self {
            Self::Lexer => "lexical",
            Self::SyntaxAnalyzer => "syntax_analyzer",
            Self::IntermediateCodeGen => "intermediate_gen",
            Self::DagBuilder => "dag_builder",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    /// Accepts the display name, the default executable name or the
    /// snake_case serde name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.display_name().to_ascii_lowercase() == wanted
                    || kind.default_base_name() == wanted
                    || serde_json::to_value(kind)
                        .ok()
                        .and_then(|v| v.as_str().map(|name| name == wanted))
                        .unwrap_or(false)
            })
            .ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(ToolKind::Lexer.to_string(), "Lexer");
        assert_eq!(ToolKind::SyntaxAnalyzer.to_string(), "Syntax Analyzer");
        assert_eq!(ToolKind::IntermediateCodeGen.to_string(), "Intermediate Code Gen");
        assert_eq!(ToolKind::DagBuilder.to_string(), "DAG Builder");
    }

    #[test]
    fn test_pipeline_order() {
        let mut sorted = ToolKind::ALL;
        sorted.sort();
        assert_eq!(sorted, ToolKind::ALL);
    }

    #[test]
    fn test_from_str_variants() {
        assert_eq!("Syntax Analyzer".parse::<ToolKind>(), Ok(ToolKind::SyntaxAnalyzer));
        assert_eq!("lexical".parse::<ToolKind>(), Ok(ToolKind::Lexer));
        assert_eq!("dag_builder".parse::<ToolKind>(), Ok(ToolKind::DagBuilder));
        assert_eq!("intermediate_code_gen".parse::<ToolKind>(), Ok(ToolKind::IntermediateCodeGen));
        assert!("assembler".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ToolKind::SyntaxAnalyzer).unwrap();
        assert_eq!(json, r#""syntax_analyzer""#);
    }
}
