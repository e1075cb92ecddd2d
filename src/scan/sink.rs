//! Ordered symbol collection.

use super::symbol::Symbol;

/// Index of a symbol inside a [`SymbolSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub usize);

/// Append-only store of symbols in source order.
#[derive(Debug, Default)]
pub struct SymbolSink {
    symbols: Vec<Symbol>,
}

impl SymbolSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol and return its index.
    pub fn append(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// All symbols in insertion order.
    pub fn all(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}
