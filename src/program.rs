//! The front-end facade: one immutable `Program` per compilation.
//!
//! Parsing and name resolution happen outside this crate. The front-end
//! assembles its results through [`ProgramBuilder`]: allocated nodes,
//! symbol entries, identifier bindings, per-node type answers and
//! per-module export lists. `finish` freezes everything into a [`Program`],
//! which both analyses then consume read-only. Independent compilations
//! build independent programs; there is no process-wide state.

use std::collections::HashMap;

use crate::ast::{Node, NodeArena, NodeId, NodeKind, SourceFileId, Span};
use crate::error::SymtrimResult;
use crate::symbols::{Symbol, SymbolId, SymbolTable};

/// One source file of the program.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path-like name, also used to locate entry modules.
    pub name: String,
    /// Declaration-only (ambient/type-shape) file.
    pub is_declaration: bool,
    /// Top-level statements in source order.
    pub statements: Vec<NodeId>,
    /// The module's own symbol; `None` when the file has no exports.
    pub module_symbol: Option<SymbolId>,
}

/// Read-only view of a fully assembled compilation unit.
#[derive(Debug)]
pub struct Program {
    arena: NodeArena,
    symbols: SymbolTable,
    files: Vec<SourceFile>,
    node_symbols: HashMap<NodeId, SymbolId>,
    node_types: HashMap<NodeId, SymbolId>,
    module_exports: HashMap<SymbolId, Vec<SymbolId>>,
}

impl Program {
    /// Look up a node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Look up a symbol by handle.
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Canonical (alias-resolved) symbol for `id`; memoized.
    pub fn canonical(&self, id: SymbolId) -> SymbolId {
        self.symbols.canonical(id)
    }

    /// The symbol a node resolves to, without alias resolution.
    pub fn symbol_at(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// The canonical symbol a node resolves to.
    pub fn resolved_symbol_at(&self, node: NodeId) -> Option<SymbolId> {
        self.symbol_at(node).map(|s| self.canonical(s))
    }

    /// Type symbol of an expression or declaration, per the front-end's
    /// type query.
    pub fn type_of(&self, node: NodeId) -> Option<SymbolId> {
        self.node_types.get(&node).copied()
    }

    /// Exported symbols of a module symbol, in declaration order.
    pub fn exports_of_module(&self, module: SymbolId) -> &[SymbolId] {
        self.module_exports
            .get(&module)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over source files with their handles.
    pub fn files(&self) -> impl Iterator<Item = (SourceFileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (SourceFileId::from_raw(i as u32), f))
    }

    /// Look up a source file by handle.
    pub fn file(&self, id: SourceFileId) -> Option<&SourceFile> {
        self.files.get(id.to_raw() as usize)
    }

    /// Find a source file by name.
    pub fn find_file(&self, name: &str) -> Option<SourceFileId> {
        self.files
            .iter()
            .position(|f| f.name == name)
            .map(|i| SourceFileId::from_raw(i as u32))
    }

    /// File name for a handle; placeholder for a stale handle.
    pub fn file_name(&self, id: SourceFileId) -> &str {
        self.file(id).map(|f| f.name.as_str()).unwrap_or("<unknown>")
    }

    /// Number of symbols in the program.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

/// Assembles a [`Program`].
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    arena: NodeArena,
    symbols: SymbolTable,
    files: Vec<SourceFile>,
    node_symbols: HashMap<NodeId, SymbolId>,
    node_types: HashMap<NodeId, SymbolId>,
    module_exports: HashMap<SymbolId, Vec<SymbolId>>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source file.
    pub fn add_file(&mut self, name: impl Into<String>, is_declaration: bool) -> SourceFileId {
        let id = SourceFileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile {
            name: name.into(),
            is_declaration,
            statements: Vec::new(),
            module_symbol: None,
        });
        id
    }

    /// Allocate a node at an explicit position.
    pub fn node_at(&mut self, file: SourceFileId, line: u32, column: u32, kind: NodeKind) -> NodeId {
        self.arena.alloc(Node::new(kind, Span::new(file, line, column)))
    }

    /// Allocate a node with a default position in `file`.
    pub fn node(&mut self, file: SourceFileId, kind: NodeKind) -> NodeId {
        self.node_at(file, 1, 0, kind)
    }

    /// Shorthand for an identifier node.
    pub fn ident(&mut self, file: SourceFileId, text: impl Into<String>) -> NodeId {
        self.node(file, NodeKind::Ident(text.into()))
    }

    /// Shorthand for an identifier node already bound to its symbol.
    pub fn ident_bound(
        &mut self,
        file: SourceFileId,
        text: impl Into<String>,
        symbol: SymbolId,
    ) -> NodeId {
        let id = self.ident(file, text);
        self.bind(id, symbol);
        id
    }

    /// Shorthand for a numeric literal node.
    pub fn number(&mut self, file: SourceFileId, value: f64) -> NodeId {
        self.node(file, NodeKind::NumberLit(value))
    }

    /// Shorthand for a string literal node.
    pub fn string(&mut self, file: SourceFileId, value: impl Into<String>) -> NodeId {
        self.node(file, NodeKind::StringLit(value.into()))
    }

    /// Append a top-level statement to a file.
    pub fn add_statement(&mut self, file: SourceFileId, node: NodeId) {
        if let Some(f) = self.files.get_mut(file.to_raw() as usize) {
            f.statements.push(node);
        }
    }

    /// Allocate a symbol entry.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.alloc(symbol)
    }

    /// Append a declaration node to a symbol.
    pub fn add_declaration(&mut self, symbol: SymbolId, node: NodeId) {
        if let Some(sym) = self.symbols.get_mut(symbol) {
            sym.declarations.push(node);
        }
    }

    /// Record identifier resolution: `node` refers to `symbol`.
    pub fn bind(&mut self, node: NodeId, symbol: SymbolId) {
        self.node_symbols.insert(node, symbol);
    }

    /// Record the front-end's type answer for a node.
    pub fn set_type(&mut self, node: NodeId, type_symbol: SymbolId) {
        self.node_types.insert(node, type_symbol);
    }

    /// Attach a module symbol to a file.
    pub fn set_module_symbol(&mut self, file: SourceFileId, symbol: SymbolId) {
        if let Some(f) = self.files.get_mut(file.to_raw() as usize) {
            f.module_symbol = Some(symbol);
        }
    }

    /// Record a module's export list and mark its members exported.
    pub fn set_exports(&mut self, module: SymbolId, exports: Vec<SymbolId>) {
        for &exported in &exports {
            if let Some(sym) = self.symbols.get_mut(exported) {
                sym.is_exported = true;
            }
        }
        self.module_exports.insert(module, exports);
    }

    /// Freeze the assembled program.
    ///
    /// Fails only on a front-end contract violation (non-terminating alias
    /// chain).
    pub fn finish(mut self) -> SymtrimResult<Program> {
        self.symbols.freeze()?;
        Ok(Program {
            arena: self.arena,
            symbols: self.symbols,
            files: self.files,
            node_symbols: self.node_symbols,
            node_types: self.node_types,
            module_exports: self.module_exports,
        })
    }
}
