//! Per-decode symbol table.
//!
//! Each symbol is appended the first time it is read; later occurrences refer
//! back to it by index. One table belongs to exactly one top-level load and
//! is dropped with it.

use crate::{Error, Result};

/// Ordered, append-only list of the symbols seen so far.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: Vec<String>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a symbol and returns its index.
    pub fn intern(&mut self, symbol: String) -> usize {
        tracing::trace!(index = self.entries.len(), symbol = %symbol, "interned symbol");
        self.entries.push(symbol);
        self.entries.len() - 1
    }

    /// Resolves a backreference read at `offset`.
    ///
    /// The index must name an entry that was already appended.
    pub fn resolve(&self, index: i64, offset: u64) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
            .ok_or_else(|| {
                Error::format(
                    offset,
                    format!(
                        "symbol link {index} out of range ({} symbols defined)",
                        self.entries.len()
                    ),
                )
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
