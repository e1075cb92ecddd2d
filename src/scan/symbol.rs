//! Symbol records emitted by the recognizer.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::token::Token;

/// Path segment used for anonymous class bodies.
pub const ANONYMOUS_SEGMENT: &str = "<anonymous>";

/// Source location of a symbol's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Line (1-indexed).
    pub line: usize,
    /// Column in characters (1-indexed).
    pub column: usize,
}

impl Span {
    pub fn from_token(token: &Token<'_>) -> Self {
        Self {
            start_byte: token.start,
            end_byte: token.end,
            line: token.line,
            column: token.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Kind of recognized declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Method,
    Constructor,
    /// Class-level declaration; only emitted when the grammar enables it.
    Type,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Type => "type",
        }
    }

    /// Check if this is a callable (method or constructor).
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Constructor)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declaration found in the source. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Modifier keywords in source order, without duplicates.
    pub modifiers: Vec<String>,
    /// Raw text between the parentheses of the parameter list.
    pub parameter_list_text: String,
    /// Line of the declaration's first token (annotation or modifier included).
    pub start_line: usize,
    /// Location of the name token.
    pub span: Span,
    /// Names of enclosing declarations, outermost first.
    pub enclosing_scope_path: Vec<String>,
    /// Nearest block comment directly preceding the declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
}

lazy_static! {
    static ref DOC_BODY: Regex = Regex::new(r"(?s)^/\*+(.*?)\*+/$").unwrap();
    static ref DOC_LINE_PREFIX: Regex = Regex::new(r"(?m)^\s*\*+ ?").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

impl Symbol {
    /// Dotted path including the symbol itself, e.g. `TestClass.main.<anonymous>.run`.
    pub fn qualified_name(&self) -> String {
        if self.enclosing_scope_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.enclosing_scope_path.join("."), self.name)
        }
    }

    /// Doc comment with delimiters and leading `*` removed, collapsed to one line.
    pub fn doc_summary(&self) -> Option<String> {
        let doc = self.doc_comment.as_deref()?.trim();
        let body = match DOC_BODY.captures(doc) {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(""),
            // unterminated comment
            None => doc.trim_start_matches('/').trim_start_matches('*'),
        };
        let body = DOC_LINE_PREFIX.replace_all(body, "");
        let summary = WHITESPACE_RUN.replace_all(body.trim(), " ").to_string();
        if summary.is_empty() {
            None
        } else {
            Some(summary)
        }
    }

    /// One-line signature, e.g. `public static test1(String blah)`.
    pub fn signature(&self) -> String {
        let params = if self.kind.is_callable() {
            format!("({})", self.parameter_list_text.trim())
        } else {
            String::new()
        };
        if self.modifiers.is_empty() {
            format!("{}{}", self.name, params)
        } else {
            format!("{} {}{}", self.modifiers.join(" "), self.name, params)
        }
    }
}
