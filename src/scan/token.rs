//! Token types produced by the lexer.

use std::fmt;

/// Classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier that is not in the grammar's keyword set.
    Identifier,
    /// Identifier that is in the grammar's keyword set.
    Keyword,
    /// Digit-led run (`42`, `0x1F`, `1.5f`).
    Number,
    /// Any single non-word, non-space character.
    Punctuation(char),
    StringLiteral,
    CharLiteral,
    /// `// ...` up to, not including, the newline.
    LineComment,
    /// `/* ... */`, possibly spanning lines.
    BlockComment,
    Whitespace,
    Newline,
    Eof,
}

impl TokenKind {
    /// Whitespace and newlines, which downstream consumers skip.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Newline)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// String, char and number literals.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral | TokenKind::CharLiteral | TokenKind::Number
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Number => "number",
            TokenKind::Punctuation(_) => "punctuation",
            TokenKind::StringLiteral => "string",
            TokenKind::CharLiteral => "char",
            TokenKind::LineComment => "line_comment",
            TokenKind::BlockComment => "block_comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Punctuation(c) => write!(f, "punctuation '{}'", c),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// A classified slice of the source.
///
/// Tokens borrow their text from the source buffer and are cheap to copy,
/// so the recognizer can buffer a bounded run of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub text: &'src str,
    /// Start byte offset (0-indexed).
    pub start: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end: usize,
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column in characters (1-indexed).
    pub column: usize,
    /// False for string/char literals and block comments that ran out of
    /// input (or, for literals, out of line) before their closing delimiter.
    pub terminated: bool,
}

impl<'src> Token<'src> {
    /// Check for a specific punctuation character.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punctuation(c)
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// Identifier or keyword, i.e. a word token.
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Keyword)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} at {}:{}", self.kind, self.text, self.line, self.column)
    }
}
