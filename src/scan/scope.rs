//! Brace-depth scope tracking.
//!
//! Scopes live on an explicit stack (indices, not pointers) so nesting depth
//! is bounded only by memory and can be inspected at any point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sink::SymbolId;
use super::symbol::ANONYMOUS_SEGMENT;
use super::token::Token;

/// What opened a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOpener {
    /// Method or constructor body.
    Declaration { name: String, symbol: SymbolId },
    /// Class/interface/enum body. `symbol` is set only when type symbols
    /// are emitted.
    Type { name: String, symbol: Option<SymbolId> },
    /// `new Name(...) { ... }`
    AnonymousClass,
    /// `if`, `for`, `while`, `catch`, `try`, ...
    ControlBlock,
    /// Anything else: initializers, lambdas, bare blocks.
    Unknown,
}

impl ScopeOpener {
    /// Segment this scope contributes to a symbol's enclosing path.
    pub fn path_segment(&self) -> Option<&str> {
        match self {
            ScopeOpener::Declaration { name, .. } | ScopeOpener::Type { name, .. } => {
                Some(name.as_str())
            }
            ScopeOpener::AnonymousClass => Some(ANONYMOUS_SEGMENT),
            ScopeOpener::ControlBlock | ScopeOpener::Unknown => None,
        }
    }

    /// Class-like scopes: named types and anonymous class bodies.
    pub fn is_class_like(&self) -> bool {
        matches!(self, ScopeOpener::Type { .. } | ScopeOpener::AnonymousClass)
    }
}

/// One open brace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Number of scopes enclosing this one.
    pub depth: usize,
    pub opener: ScopeOpener,
    /// Line of the opening brace.
    pub opened_line: usize,
    /// Byte offset of the opening brace.
    pub opened_offset: usize,
}

/// A `}` arrived with no open scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unmatched closing brace at line {line}")]
pub struct UnbalancedClose {
    pub line: usize,
}

/// Push/pop accounting for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStats {
    pub pushed: usize,
    pub popped: usize,
    /// Scopes still open at end of input.
    pub force_closed: usize,
    pub max_depth: usize,
}

/// Stack of open scopes.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    scopes: Vec<Scope>,
    stats: ScopeStats,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope for the `{` token and return its depth.
    pub fn push(&mut self, opener: ScopeOpener, brace: &Token<'_>) -> usize {
        let depth = self.scopes.len();
        tracing::trace!(depth, line = brace.line, opener = ?opener, "push scope");
        self.scopes.push(Scope {
            depth,
            opener,
            opened_line: brace.line,
            opened_offset: brace.start,
        });
        self.stats.pushed += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.scopes.len());
        depth
    }

    /// Close the innermost scope for the `}` token.
    pub fn pop(&mut self, brace: &Token<'_>) -> Result<Scope, UnbalancedClose> {
        let scope = self
            .scopes
            .pop()
            .ok_or(UnbalancedClose { line: brace.line })?;
        tracing::trace!(depth = scope.depth, line = brace.line, "pop scope");
        self.stats.popped += 1;
        Ok(scope)
    }

    /// Force-close everything still open, innermost first.
    pub fn close_all(&mut self) -> Vec<Scope> {
        let mut closed: Vec<Scope> = self.scopes.drain(..).collect();
        closed.reverse();
        self.stats.force_closed += closed.len();
        closed
    }

    pub fn current_scope(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Names of enclosing declaration, type and anonymous scopes, outer to inner.
    pub fn scope_path(&self) -> Vec<String> {
        self.scopes
            .iter()
            .filter_map(|s| s.opener.path_segment())
            .map(str::to_string)
            .collect()
    }

    /// Innermost class-like scope: `Some(name)` for a named type, `None`
    /// when the innermost is anonymous or there is none.
    pub fn enclosing_type_name(&self) -> Option<&str> {
        match self.scopes.iter().rev().find(|s| s.opener.is_class_like()) {
            Some(Scope {
                opener: ScopeOpener::Type { name, .. },
                ..
            }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether the innermost scope is a named type body.
    pub fn directly_in_type(&self) -> bool {
        matches!(
            self.current_scope().map(|s| &s.opener),
            Some(ScopeOpener::Type { .. })
        )
    }

    pub fn stats(&self) -> ScopeStats {
        self.stats
    }
}
