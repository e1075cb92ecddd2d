//! Bracetag - single-pass declaration tagger for brace-delimited languages.
//!
//! Bracetag finds method and constructor declarations in Java-like source
//! without building a syntax tree. One left-to-right pass lexes the input,
//! tracks brace-delimited scopes and decides, at every `{`, whether the
//! tokens before it declared something. Malformed input is recovered from
//! and reported as diagnostics; a scan never fails on source content.
//!
//! # Architecture
//!
//! - `scan`: the core pipeline (lexer, recognizer, scope tracker, sink)
//! - `profile`: YAML language profiles and the language registry
//! - `runner`: parallel multi-file scanning
//! - `report`: output formatting (pretty, JSON, ctags)
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```
//! use bracetag::scan::{Grammar, Scanner};
//!
//! let result = Scanner::new(Grammar::java())
//!     .scan("class A { public static void main(String[] args) { run(); } }");
//! assert_eq!(result.symbols.len(), 1);
//! assert_eq!(result.symbols[0].name, "main");
//! assert_eq!(result.symbols[0].enclosing_scope_path, vec!["A"]);
//! ```
//!
//! # Adding a New Language
//!
//! Write a YAML profile (see `src/profiles/java.yaml`) and either embed it
//! in `profile.rs` or drop it into the user profile directory.

pub mod cli;
pub mod profile;
pub mod report;
pub mod runner;
pub mod scan;

pub use profile::{Language, LanguageProfile, ProfileError};
pub use runner::{collect_files, FileScan, Runner};
pub use scan::{
    Diagnostic, DiagnosticKind, Grammar, ScanError, ScanResult, Scanner, Severity, Symbol,
    SymbolKind,
};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    profile::init();
}

/// Scan `source` with the default (Java) grammar.
pub fn scan(source: &str) -> ScanResult {
    Scanner::new(Grammar::java()).scan(source)
}
