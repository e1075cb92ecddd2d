//! Single-pass declaration scanner for brace-delimited languages.
//!
//! The scan is a pipeline of four stages that share no global state:
//!
//! - `lexer`: pull-based tokenizer over borrowed source text
//! - `recognizer`: decides what each `{` opens from the tokens before it
//! - `scope`: brace-depth stack producing enclosing paths
//! - `sink`: ordered symbol store
//!
//! `pipeline` wires them together and collects diagnostics. Everything is
//! driven by a [`Grammar`] compiled from a language profile.

pub mod diagnostics;
pub mod grammar;
pub mod lexer;
pub mod pipeline;
pub mod recognizer;
pub mod scope;
pub mod sink;
pub mod symbol;
pub mod token;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use grammar::Grammar;
pub use lexer::Lexer;
pub use pipeline::{scan, ScanError, ScanResult, Scanner};
pub use recognizer::{Decision, Recognizer, RecognizerState};
pub use scope::{Scope, ScopeOpener, ScopeStats, ScopeTracker, UnbalancedClose};
pub use sink::{SymbolId, SymbolSink};
pub use symbol::{Span, Symbol, SymbolKind, ANONYMOUS_SEGMENT};
pub use token::{Token, TokenKind};
