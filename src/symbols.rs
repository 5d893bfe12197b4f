//! Symbol identity and the per-program symbol table.
//!
//! A symbol is the canonical identity of a name binding, independent of
//! which reference expression points to it. Alias symbols (re-exports,
//! import bindings) carry a target; canonicalization resolves the chain to
//! a non-alias symbol and is memoized once when the table is frozen, so
//! lookups during analysis are O(1).

use crate::ast::arena::define_id;
use crate::ast::NodeId;
use crate::error::{SymtrimError, SymtrimResult};
use std::fmt;

define_id!(SymbolId);

/// Metadata describing a single symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Declaration nodes in source order.
    pub declarations: Vec<NodeId>,
    /// Target of an alias symbol; `None` for concrete symbols.
    pub alias_target: Option<SymbolId>,
    pub is_const_enum: bool,
    pub is_exported: bool,
    /// Whether this symbol is a namespace module (the symbol of a whole
    /// source file with exports).
    pub is_namespace_module: bool,
}

impl Symbol {
    /// A concrete symbol with no declarations yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
            alias_target: None,
            is_const_enum: false,
            is_exported: false,
            is_namespace_module: false,
        }
    }

    /// An alias symbol re-binding `target`.
    pub fn alias(name: impl Into<String>, target: SymbolId) -> Self {
        let mut sym = Self::new(name);
        sym.alias_target = Some(target);
        sym
    }

    pub fn is_alias(&self) -> bool {
        self.alias_target.is_some()
    }
}

/// Central registry of all symbols of one compilation unit.
///
/// Mutable while the front-end assembles the program; frozen (and its alias
/// canonicalization memoized) before any analysis runs.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
    /// Memoized alias resolution, one entry per symbol. Empty until frozen.
    canonical: Vec<SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new symbol entry.
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::from_raw(self.entries.len() as u32);
        self.entries.push(symbol);
        id
    }

    /// Retrieve a symbol by identifier.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.entries.get(id.to_raw() as usize)
    }

    /// Mutable access, only available before the table is frozen.
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.entries.get_mut(id.to_raw() as usize)
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table currently has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over stored symbols with their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::from_raw(i as u32), s))
    }

    /// Resolve every alias chain once and memoize the results.
    ///
    /// The front-end contract requires every chain to terminate at a
    /// non-alias symbol; a chain longer than the table (a cycle) is
    /// reported as an internal error.
    pub fn freeze(&mut self) -> SymtrimResult<()> {
        let max_hops = self.entries.len();
        let mut canonical = Vec::with_capacity(max_hops);
        for (id, _) in self.entries.iter().enumerate() {
            let mut current = SymbolId::from_raw(id as u32);
            let mut hops = 0usize;
            while let Some(target) = self.get(current).and_then(|s| s.alias_target) {
                current = target;
                hops += 1;
                if hops > max_hops {
                    return Err(SymtrimError::internal(format!(
                        "alias chain starting at symbol '{}' does not terminate",
                        self.get(SymbolId::from_raw(id as u32))
                            .map(|s| s.name.as_str())
                            .unwrap_or("<unknown>")
                    )));
                }
            }
            canonical.push(current);
        }
        self.canonical = canonical;
        Ok(())
    }

    /// Canonical (alias-resolved) symbol for `id`.
    ///
    /// Idempotent: the canonical symbol of a canonical symbol is itself.
    /// Falls back to resolving on the fly if the table was not frozen.
    pub fn canonical(&self, id: SymbolId) -> SymbolId {
        if let Some(&resolved) = self.canonical.get(id.to_raw() as usize) {
            return resolved;
        }
        let mut current = id;
        let mut hops = 0usize;
        while let Some(target) = self.get(current).and_then(|s| s.alias_target) {
            current = target;
            hops += 1;
            if hops > self.entries.len() {
                break;
            }
        }
        current
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_raw())
    }
}
