//! Pull-based lexer.
//!
//! Comments and string/char literal bodies are consumed atomically, so a
//! `{` inside `"..."` or `/* ... */` never reaches structural analysis.
//! Unterminated literals and comments are returned with
//! `terminated == false`; the lexer itself never fails.

use super::grammar::Grammar;
use super::token::{Token, TokenKind};

/// Lazy token stream over one immutable source buffer.
///
/// Yields every token including whitespace and newlines, followed by a
/// single `Eof` token.
pub struct Lexer<'src, 'g> {
    source: &'src str,
    grammar: &'g Grammar,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'src, 'g> Lexer<'src, 'g> {
    /// Create a lexer positioned at the start of `source`.
    pub fn new(source: &'src str, grammar: &'g Grammar) -> Self {
        Self {
            source,
            grammar,
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Create a lexer that resumes at `offset`.
    ///
    /// The offset is clamped to the buffer and moved back to the nearest
    /// char boundary. Line and column are recomputed from the prefix.
    pub fn starting_at(source: &'src str, grammar: &'g Grammar, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let mut lexer = Self::new(source, grammar);
        lexer.advance_position(&source[..offset]);
        lexer.pos = offset;
        lexer
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// View that skips whitespace and newline tokens.
    pub fn significant(self) -> std::iter::Filter<Self, fn(&Token<'src>) -> bool> {
        fn keep(token: &Token<'_>) -> bool {
            !token.kind.is_whitespace()
        }
        self.filter(keep as fn(&Token<'src>) -> bool)
    }

    fn advance_position(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Emit the token covering `self.pos..end` and move past it.
    fn emit(&mut self, kind: TokenKind, end: usize, terminated: bool) -> Token<'src> {
        let text = &self.source[self.pos..end];
        let token = Token {
            kind,
            text,
            start: self.pos,
            end,
            line: self.line,
            column: self.column,
            terminated,
        };
        self.advance_position(text);
        self.pos = end;
        token
    }

    fn lex_line_comment(&mut self) -> Token<'src> {
        let rest = &self.source[self.pos..];
        let mut len = rest.find('\n').unwrap_or(rest.len());
        if rest[..len].ends_with('\r') {
            len -= 1;
        }
        self.emit(TokenKind::LineComment, self.pos + len, true)
    }

    fn lex_block_comment(&mut self, open: &str, close: &str) -> Token<'src> {
        let body_start = self.pos + open.len();
        match self.source[body_start..].find(close) {
            Some(idx) => self.emit(TokenKind::BlockComment, body_start + idx + close.len(), true),
            None => self.emit(TokenKind::BlockComment, self.source.len(), false),
        }
    }

    /// Quoted literal ending at the next unescaped `delim` on the same
    /// logical line. A backslash consumes the following character,
    /// including a newline.
    fn lex_quoted(&mut self, kind: TokenKind, delim: char) -> Token<'src> {
        let body_start = self.pos + delim.len_utf8();
        let mut chars = self.source[body_start..].char_indices();

        while let Some((idx, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => {
                    let mut end = body_start + idx;
                    if self.source[..end].ends_with('\r') {
                        end -= 1;
                    }
                    return self.emit(kind, end, false);
                }
                c if c == delim => {
                    return self.emit(kind, body_start + idx + c.len_utf8(), true);
                }
                _ => {}
            }
        }

        self.emit(kind, self.source.len(), false)
    }

    /// Verbatim literal after a `prefix_len`-byte prefix such as `@`. Spans
    /// lines; backslashes are plain text and a doubled delimiter is an
    /// escaped one.
    fn lex_verbatim(&mut self, prefix_len: usize) -> Token<'src> {
        let open = self.pos + prefix_len;
        let delim = match self.source[open..].chars().next() {
            Some(c) => c,
            None => return self.emit(TokenKind::StringLiteral, self.source.len(), false),
        };
        let body_start = open + delim.len_utf8();
        let mut chars = self.source[body_start..].char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if c != delim {
                continue;
            }
            if chars.peek().map_or(false, |&(_, next)| next == delim) {
                chars.next();
                continue;
            }
            return self.emit(TokenKind::StringLiteral, body_start + idx + c.len_utf8(), true);
        }

        self.emit(TokenKind::StringLiteral, self.source.len(), false)
    }

    fn lex_run<F>(&mut self, kind: TokenKind, keep: F) -> Token<'src>
    where
        F: Fn(char) -> bool,
    {
        let rest = &self.source[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !keep(c))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        self.emit(kind, self.pos + len, true)
    }

    fn lex_word(&mut self) -> Token<'src> {
        let mut token = self.lex_run(TokenKind::Identifier, is_identifier_char);
        if self.grammar.is_keyword(token.text) {
            token.kind = TokenKind::Keyword;
        }
        token
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl<'src, 'g> Iterator for Lexer<'src, 'g> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.finished {
            return None;
        }

        let rest = &self.source[self.pos..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => {
                self.finished = true;
                return Some(self.emit(TokenKind::Eof, self.pos, true));
            }
        };

        if c == '\n' {
            return Some(self.emit(TokenKind::Newline, self.pos + 1, true));
        }
        if rest.starts_with("\r\n") {
            return Some(self.emit(TokenKind::Newline, self.pos + 2, true));
        }

        let grammar = self.grammar;
        if let Some(marker) = grammar.line_comment() {
            if rest.starts_with(marker) {
                return Some(self.lex_line_comment());
            }
        }
        if let Some((open, close)) = grammar.block_comment() {
            if rest.starts_with(open) {
                return Some(self.lex_block_comment(open, close));
            }
        }

        if c.is_whitespace() {
            let token = self.lex_run(TokenKind::Whitespace, |c| c.is_whitespace() && c != '\n');
            // keep "\r\n" together as one newline
            if token.text.ends_with('\r') && self.source[self.pos..].starts_with('\n') {
                let mut trimmed = token;
                trimmed.text = &token.text[..token.text.len() - 1];
                trimmed.end -= 1;
                self.pos -= 1;
                self.column -= 1;
                if trimmed.text.is_empty() {
                    return self.next();
                }
                return Some(trimmed);
            }
            return Some(token);
        }

        if let Some(prefix_len) = grammar.verbatim_prefix_len(rest) {
            return Some(self.lex_verbatim(prefix_len));
        }
        if grammar.is_string_delimiter(c) {
            return Some(self.lex_quoted(TokenKind::StringLiteral, c));
        }
        if grammar.is_char_delimiter(c) {
            return Some(self.lex_quoted(TokenKind::CharLiteral, c));
        }

        if is_identifier_start(c) {
            return Some(self.lex_word());
        }
        if c.is_ascii_digit() {
            return Some(self.lex_run(TokenKind::Number, |c| {
                c.is_alphanumeric() || c == '_' || c == '.'
            }));
        }

        Some(self.emit(TokenKind::Punctuation(c), self.pos + c.len_utf8(), true))
    }
}
