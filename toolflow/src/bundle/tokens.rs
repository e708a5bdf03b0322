//! Token table parsing.
//!
//! The lexer writes a two-line header followed by one row per token:
//!
//! ```text
//! Token Num    | Type            | Lexeme
//! --------------------------------------------------
//! 1            | KEYWORD         | int
//! ```

use serde::{Deserialize, Serialize};

/// Column separator used by the lexer.
pub const SEPARATOR: &str = " | ";

/// Number of preamble lines before the first row.
pub const HEADER_LINES: usize = 2;

/// One line of the token table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum TokenRow {
    /// A well-formed `index | type | lexeme` line.
    Token {
        /// Token number as written by the lexer.
        index: String,
        /// Token category.
        kind: String,
        /// Source text of the token.
        lexeme: String,
    },
    /// A line that did not split into three columns. Kept, not dropped.
    ParseError {
        /// The offending line, trimmed.
        line: String,
    },
}

impl TokenRow {
    /// Returns true for [`TokenRow::ParseError`].
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}

/// Overall shape of the parsed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTableState {
    /// No lexer output at all.
    Empty,
    /// Fewer lines than the header plus one row.
    Malformed,
    /// A header followed only by blank lines.
    NoTokens,
    /// At least one row.
    Rows,
}

/// A parsed token table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTable {
    /// Shape of the input.
    pub state: TokenTableState,
    /// Rows in file order.
    pub rows: Vec<TokenRow>,
}

impl TokenTable {
    /// Parses lexer output text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::with_state(TokenTableState::Empty);
        }

        let lines: Vec<&str> = text.lines().collect();
        if lines.len() <= HEADER_LINES {
            return Self::with_state(TokenTableState::Malformed);
        }

        let rows: Vec<TokenRow> = lines[HEADER_LINES..]
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(parse_row)
            .collect();

        let state = if rows.is_empty() {
            TokenTableState::NoTokens
        } else {
            TokenTableState::Rows
        };
        Self { state, rows }
    }

    fn with_state(state: TokenTableState) -> Self {
        Self {
            state,
            rows: Vec::new(),
        }
    }

    /// Number of rows that failed to parse.
    #[must_use]
    pub fn parse_errors(&self) -> usize {
        self.rows.iter().filter(|row| row.is_parse_error()).count()
    }
}

fn parse_row(line: &str) -> TokenRow {
    let parts: Vec<&str> = line.splitn(3, SEPARATOR).collect();
    match parts.as_slice() {
        [index, kind, lexeme] => TokenRow::Token {
            index: index.trim().to_string(),
            kind: kind.trim().to_string(),
            lexeme: lexeme.trim().to_string(),
        },
        _ => TokenRow::ParseError {
            line: line.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_row() {
        let table = TokenTable::parse("H1\nH2\n1 | ID | foo\n");
        assert_eq!(table.state, TokenTableState::Rows);
        assert_eq!(
            table.rows,
            vec![TokenRow::Token {
                index: "1".to_string(),
                kind: "ID".to_string(),
                lexeme: "foo".to_string(),
            }]
        );
    }

    #[test]
    fn test_padded_lexer_columns() {
        let text = "Token Num    | Type            | Lexeme\n\
                    --------------------------------------------------\n\
                    1            | KEYWORD         | int\n\
                    2            | IDENTIFIER      | main\n";
        let table = TokenTable::parse(text);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[1],
            TokenRow::Token {
                index: "2".to_string(),
                kind: "IDENTIFIER".to_string(),
                lexeme: "main".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_line_kept_as_error_row() {
        let table = TokenTable::parse("H1\nH2\n1 | ID | foo\ngarbage line\n2 | OP\n");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.parse_errors(), 2);
        assert_eq!(
            table.rows[1],
            TokenRow::ParseError {
                line: "garbage line".to_string()
            }
        );
    }

    #[test]
    fn test_lexeme_may_contain_separator() {
        let table = TokenTable::parse("H1\nH2\n7 | OPERATOR | | | \n9 | STRING | \"a | b\"");
        assert_eq!(
            table.rows[1],
            TokenRow::Token {
                index: "9".to_string(),
                kind: "STRING".to_string(),
                lexeme: "\"a | b\"".to_string(),
            }
        );
        assert!(!table.rows[0].is_parse_error());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = TokenTable::parse("H1\nH2\n\n1 | ID | a\n   \n");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_table_states() {
        assert_eq!(TokenTable::parse("").state, TokenTableState::Empty);
        assert_eq!(TokenTable::parse("H1\nH2\n").state, TokenTableState::Malformed);
        assert_eq!(TokenTable::parse("H1\nH2\n\n").state, TokenTableState::NoTokens);
    }
}
