//! Non-fatal conditions reported alongside the symbol list.

use serde::{Deserialize, Serialize};

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    #[serde(rename = "unterminated_comment")]
    UnterminatedComment,
    #[serde(rename = "unterminated_string")]
    UnterminatedString,
    #[serde(rename = "unbalanced_braces")]
    UnbalancedBraces,
    #[serde(rename = "unexpected_eof")]
    UnexpectedEof,
    /// A candidate looked like both a call and a declaration and was declined.
    #[serde(rename = "recognition_ambiguity")]
    RecognitionAmbiguity,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnterminatedComment => "unterminated_comment",
            DiagnosticKind::UnterminatedString => "unterminated_string",
            DiagnosticKind::UnbalancedBraces => "unbalanced_braces",
            DiagnosticKind::UnexpectedEof => "unexpected_eof",
            DiagnosticKind::RecognitionAmbiguity => "recognition_ambiguity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unterminated_comment" => Some(DiagnosticKind::UnterminatedComment),
            "unterminated_string" => Some(DiagnosticKind::UnterminatedString),
            "unbalanced_braces" => Some(DiagnosticKind::UnbalancedBraces),
            "unexpected_eof" => Some(DiagnosticKind::UnexpectedEof),
            "recognition_ambiguity" => Some(DiagnosticKind::RecognitionAmbiguity),
            _ => None,
        }
    }

    /// Default severity: ambiguity is informational, the rest indicate
    /// malformed input.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::RecognitionAmbiguity => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Lexical and structural conditions, as opposed to recognition notes.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnbalancedBraces | DiagnosticKind::UnexpectedEof
        )
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recovered condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Line number (1-indexed).
    pub line: usize,
    pub severity: Severity,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity.
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            severity: kind.severity(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.line, self.severity, self.kind, self.message
        )
    }
}
