//! Schema file loading and statement splitting.
//!
//! The splitter understands enough MySQL lexical structure to keep `;`
//! inside quoted text and comments from ending a statement:
//!
//! - `'...'`, `"..."` (backslash escapes, doubled quotes) and `` `...` ``
//! - `-- ...` and `# ...` line comments
//! - `/* ... */` block comments
//!
//! Client-side `DELIMITER` directives are not supported; stored routines
//! whose bodies contain `;` must be applied separately.

use std::io;
use std::path::Path;

use crate::error::ProvisionError;

/// Read the schema file at `path`.
pub fn load_schema(path: &Path) -> Result<String, ProvisionError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ProvisionError::SchemaNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProvisionError::SchemaRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Split schema text into executable statements, in file order.
///
/// Each statement is trimmed and has its leading comments removed.
/// Fragments that are empty or contain only comments are dropped. Text
/// after the last `;` counts as a final statement.
///
/// If the input ends inside a quoted string or a block comment, the
/// remaining text is returned unaltered as the last statement.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = Lex::Code;
    let mut chars = sql.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match state {
            Lex::Code => match c {
                ';' => {
                    push_statement(&mut statements, &current);
                    current.clear();
                    continue;
                }
                '\'' | '"' | '`' => state = Lex::Quoted(c),
                '#' => state = Lex::LineComment,
                '-' if is_dash_comment(&sql[pos..]) => state = Lex::LineComment,
                '/' if next == Some('*') => {
                    current.push_str("/*");
                    chars.next();
                    state = Lex::BlockComment;
                    continue;
                }
                _ => {}
            },
            Lex::Quoted(quote) => {
                if c == '\\' && quote != '`' {
                    current.push(c);
                    if let Some((_, escaped)) = chars.next() {
                        current.push(escaped);
                    }
                    continue;
                }
                if c == quote {
                    state = Lex::Code;
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if c == '*' && next == Some('/') {
                    current.push_str("*/");
                    chars.next();
                    state = Lex::Code;
                    continue;
                }
            }
        }
        current.push(c);
    }

    match state {
        Lex::Code | Lex::LineComment => push_statement(&mut statements, &current),
        Lex::Quoted(_) | Lex::BlockComment => {
            let fragment = current.trim();
            tracing::warn!(
                state = ?state,
                preview = %fragment.chars().take(60).collect::<String>(),
                "Schema ends inside an unterminated quote or comment",
            );
            if !fragment.is_empty() {
                statements.push(fragment.to_string());
            }
        }
    }
    statements
}

fn push_statement(statements: &mut Vec<String>, fragment: &str) {
    let statement = strip_leading_comments(fragment).trim_end();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
}

/// Whether `text` starts with a `--` comment marker.
///
/// MySQL requires whitespace or a control character after the second dash,
/// so `1--2` is arithmetic. A bare `--` at end of input is a comment.
fn is_dash_comment(text: &str) -> bool {
    text.strip_prefix("--").is_some_and(|after| {
        after
            .chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c.is_control())
    })
}

/// Drop whitespace and comments preceding the first SQL token.
///
/// `/*! ... */` is a MySQL executable comment and is kept.
fn strip_leading_comments(fragment: &str) -> &str {
    let mut rest = fragment.trim_start();
    loop {
        if is_dash_comment(rest) || rest.starts_with('#') {
            rest = match rest.find('\n') {
                Some(pos) => rest[pos + 1..].trim_start(),
                None => "",
            };
        } else if rest.starts_with("/*") && !rest.starts_with("/*!") {
            rest = match rest.find("*/") {
                Some(pos) => rest[pos + 2..].trim_start(),
                None => "",
            };
        } else {
            return rest;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
