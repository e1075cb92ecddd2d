//! Single-pass scan: lexer -> recognizer -> scope tracker -> sink.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use super::grammar::Grammar;
use super::lexer::Lexer;
use super::recognizer::{Ambiguity, Decision, Recognizer};
use super::scope::{ScopeOpener, ScopeStats, ScopeTracker};
use super::sink::{SymbolId, SymbolSink};
use super::symbol::Symbol;
use super::token::{Token, TokenKind};

/// Errors that prevent a scan from starting.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("source is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidEncoding { valid_up_to: usize },
}

/// Everything a scan produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Symbols in order of their name token's position.
    pub symbols: Vec<Symbol>,
    /// Diagnostics in order of occurrence.
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ScopeStats,
}

impl ScanResult {
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    pub fn symbols_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| s.name == name)
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// Scans source text with one grammar. Holds no per-scan state, so one
/// scanner can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'g> {
    grammar: &'g Grammar,
}

impl<'g> Scanner<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Scan `source`. Never fails: malformed input yields diagnostics.
    pub fn scan(&self, source: &str) -> ScanResult {
        let mut pass = Pass::new(source, self.grammar);
        for token in Lexer::new(source, self.grammar).significant() {
            pass.feed(token);
        }
        pass.finish()
    }

    /// Scan raw bytes, rejecting anything that is not UTF-8.
    pub fn scan_bytes(&self, source: &[u8]) -> Result<ScanResult, ScanError> {
        let text = std::str::from_utf8(source).map_err(|e| ScanError::InvalidEncoding {
            valid_up_to: e.valid_up_to(),
        })?;
        Ok(self.scan(text))
    }
}

/// Scan `source` with `grammar`.
pub fn scan(source: &str, grammar: &Grammar) -> ScanResult {
    Scanner::new(grammar).scan(source)
}

/// State for one scan.
struct Pass<'src, 'g> {
    recognizer: Recognizer<'src, 'g>,
    tracker: ScopeTracker,
    sink: SymbolSink,
    diagnostics: Vec<Diagnostic>,
    eof_line: usize,
}

impl<'src, 'g> Pass<'src, 'g> {
    fn new(source: &'src str, grammar: &'g Grammar) -> Self {
        Self {
            recognizer: Recognizer::new(source, grammar),
            tracker: ScopeTracker::new(),
            sink: SymbolSink::new(),
            diagnostics: Vec::new(),
            eof_line: 1,
        }
    }

    fn feed(&mut self, token: Token<'src>) {
        match token.kind {
            TokenKind::BlockComment if !token.terminated => {
                self.report(
                    DiagnosticKind::UnterminatedComment,
                    token.line,
                    "block comment is never closed",
                );
                self.recognizer.observe(token);
            }
            TokenKind::StringLiteral | TokenKind::CharLiteral if !token.terminated => {
                self.report(
                    DiagnosticKind::UnterminatedString,
                    token.line,
                    format!("{} literal is not closed before end of line", token.kind),
                );
                self.recognizer.observe(token);
            }
            TokenKind::Punctuation('{') => self.open_scope(token),
            TokenKind::Punctuation('}') => self.close_scope(token),
            TokenKind::Punctuation(';') => {
                if let Some(decision) = self.recognizer.on_semicolon(token, &self.tracker) {
                    match decision {
                        Decision::Declaration(symbol) => {
                            self.emit(symbol);
                        }
                        Decision::Ambiguous(ambiguity) => self.report_ambiguity(ambiguity),
                        _ => {}
                    }
                }
            }
            TokenKind::Eof => self.eof_line = token.line,
            _ => self.recognizer.observe(token),
        }
    }

    fn open_scope(&mut self, brace: Token<'src>) {
        let opener = match self.recognizer.on_open_brace(&self.tracker) {
            Decision::Declaration(symbol) => {
                let name = symbol.name.clone();
                let symbol = self.emit(symbol);
                ScopeOpener::Declaration { name, symbol }
            }
            Decision::Type { name, symbol } => {
                let symbol = symbol.map(|s| self.emit(s));
                ScopeOpener::Type { name, symbol }
            }
            Decision::AnonymousClass => ScopeOpener::AnonymousClass,
            Decision::ControlBlock => ScopeOpener::ControlBlock,
            Decision::Unknown => ScopeOpener::Unknown,
            Decision::Ambiguous(ambiguity) => {
                self.report_ambiguity(ambiguity);
                ScopeOpener::Unknown
            }
        };
        self.tracker.push(opener, &brace);
    }

    fn close_scope(&mut self, brace: Token<'src>) {
        match self.tracker.pop(&brace) {
            Ok(scope) => self.recognizer.on_close_brace(Some(scope.depth)),
            Err(err) => {
                self.report(DiagnosticKind::UnbalancedBraces, err.line, err.to_string());
                self.recognizer.on_close_brace(None);
            }
        }
    }

    fn emit(&mut self, symbol: Symbol) -> SymbolId {
        tracing::debug!(
            name = %symbol.qualified_name(),
            kind = %symbol.kind,
            line = symbol.start_line,
            "symbol"
        );
        self.sink.append(symbol)
    }

    fn report_ambiguity(&mut self, ambiguity: Ambiguity) {
        self.report(
            DiagnosticKind::RecognitionAmbiguity,
            ambiguity.line,
            format!(
                "'{}' read as a call, not a declaration: {}",
                ambiguity.name, ambiguity.reason
            ),
        );
    }

    fn report(&mut self, kind: DiagnosticKind, line: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, line, message);
        tracing::debug!(%diagnostic, "diagnostic");
        self.diagnostics.push(diagnostic);
    }

    fn finish(mut self) -> ScanResult {
        if let Some(innermost) = self.tracker.current_scope().map(|s| s.opened_line) {
            let open = self.tracker.depth();
            self.report(
                DiagnosticKind::UnbalancedBraces,
                self.eof_line,
                format!(
                    "end of input with {} unclosed scope(s); innermost opened at line {}",
                    open, innermost
                ),
            );
            self.tracker.close_all();
        } else if self.recognizer.in_paren_group() {
            self.report(
                DiagnosticKind::UnexpectedEof,
                self.eof_line,
                "end of input inside a parenthesized group",
            );
        }

        ScanResult {
            symbols: self.sink.into_symbols(),
            diagnostics: self.diagnostics,
            stats: self.tracker.stats(),
        }
    }
}
