//! Comparison Set Module
//!
//! Ordered, deduplicated selection of symbols for side-by-side comparison.

use crate::models::Symbol;

/// Maximum number of symbols that can be compared at once.
pub const MAX_COMPARISON: usize = 5;

// == Comparison Set ==
/// Bounded selection set. Insertion beyond the cap is rejected; nothing is
/// ever evicted to make room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonSet {
    symbols: Vec<Symbol>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    // == Add ==
    /// Canonicalizes and appends `raw`.
    ///
    /// Returns false when the symbol is invalid, already present, or the set
    /// is full.
    pub fn add(&mut self, raw: &str) -> bool {
        match Symbol::parse(raw) {
            Ok(symbol) => self.add_symbol(symbol),
            Err(_) => false,
        }
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> bool {
        if self.contains(&symbol) || !self.can_add() {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    // == Remove ==
    /// Removes `raw` if present. Returns true if something was removed.
    pub fn remove(&mut self, raw: &str) -> bool {
        let Ok(symbol) = Symbol::parse(raw) else {
            return false;
        };
        let before = self.symbols.len();
        self.symbols.retain(|s| *s != symbol);
        self.symbols.len() != before
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    pub fn can_add(&self) -> bool {
        self.symbols.len() < MAX_COMPARISON
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
