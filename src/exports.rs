//! Export reachability analysis.
//!
//! Builds, once per compilation, the transitive closure of symbols visible
//! through the exported surface of the configured entry modules. The
//! closure answers one question for the renaming consumer: is this symbol
//! part of the public contract, or is it free to be mangled?
//!
//! Implementation notes:
//! - Declaration walks are flattened into symbol-to-symbol reference edges,
//!   extracted lazily (only for symbols actually reached) with an explicit
//!   node stack — no recursion, so deep or cyclic type graphs cannot
//!   overflow the stack.
//! - Edges land in a petgraph `DiGraphMap`; each root's closure is a BFS
//!   over it with a per-root visited set, O(|V| + |E|) in the reachable
//!   subgraph.
//! - A variable declaration contributes its resolved *type* symbol only,
//!   and as a non-expanding edge: the type is part of the contract, its
//!   implementation details are not pulled in through the variable.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graphmap::DiGraphMap;
use tracing::{debug, trace, warn};

use crate::ast::{NodeId, NodeKind};
use crate::error::{SymtrimError, SymtrimResult};
use crate::program::Program;
use crate::symbols::SymbolId;

/// How a referenced symbol joins the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeKind {
    /// Referenced symbol joins the closure and its declarations are walked.
    Expand,
    /// Referenced symbol joins the closure but is not walked further
    /// (variable type symbols).
    Include,
}

/// Lazily populated symbol reference graph shared by all roots.
#[derive(Default)]
struct ReferenceGraph {
    graph: DiGraphMap<SymbolId, EdgeKind>,
    expanded: HashSet<SymbolId>,
}

impl ReferenceGraph {
    /// Extract `symbol`'s outgoing edges if not done yet.
    fn ensure_expanded(&mut self, program: &Program, symbol: SymbolId) {
        if !self.expanded.insert(symbol) {
            return;
        }
        self.graph.add_node(symbol);
        for (target, kind) in collect_symbol_edges(program, symbol) {
            if target == symbol {
                continue;
            }
            // An expanding edge always wins over an including one.
            match self.graph.edge_weight(symbol, target) {
                Some(EdgeKind::Expand) => {}
                _ => {
                    self.graph.add_edge(symbol, target, kind);
                }
            }
        }
    }
}

/// Walk every declaration of `symbol` and collect the symbols it exposes.
///
/// This reproduces the contract-vs-implementation walk rules exactly:
/// namespace re-exports pull in a whole module's surface, variable
/// declarations contribute their type only, blocks, doc comments and
/// private class members are never walked.
fn collect_symbol_edges(program: &Program, symbol: SymbolId) -> Vec<(SymbolId, EdgeKind)> {
    let mut edges: Vec<(SymbolId, EdgeKind)> = Vec::new();
    let mut seen: HashMap<SymbolId, usize> = HashMap::new();
    let mut push = |edges: &mut Vec<(SymbolId, EdgeKind)>, target: SymbolId, kind: EdgeKind| {
        if let Some(&slot) = seen.get(&target) {
            if kind == EdgeKind::Expand {
                edges[slot].1 = EdgeKind::Expand;
            }
        } else {
            seen.insert(target, edges.len());
            edges.push((target, kind));
        }
    };

    let Some(entry) = program.symbol(symbol) else {
        return edges;
    };

    let mut stack: Vec<NodeId> = entry.declarations.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(node) = program.node(id) else {
            continue;
        };
        match &node.kind {
            // Implementation, not contract.
            NodeKind::Block(_) | NodeKind::DocComment(_) => {}

            // Private members are invisible to the exported surface even
            // though they nest under a reachable type.
            NodeKind::ClassMember {
                is_private: true, ..
            } => {}

            NodeKind::VarStatement(decls) => {
                stack.extend(decls.iter().rev());
            }

            // Only the variable's resolved type is contract; the
            // initializer is never walked.
            NodeKind::VarDecl { .. } => {
                if let Some(ty) = program.type_of(id) {
                    push(&mut edges, program.canonical(ty), EdgeKind::Include);
                }
            }

            // `export * as ns from './m'`: resolve the alias to the module
            // and pull in every export of it.
            NodeKind::NamespaceExport { name } => {
                let Some(alias) = program.symbol_at(*name) else {
                    continue;
                };
                if !program.symbol(alias).is_some_and(|s| s.is_alias()) {
                    continue;
                }
                let module = program.canonical(alias);
                let module_exports = program.exports_of_module(module);
                if module_exports.is_empty() {
                    warn!(module = %module, "namespace export resolves to a module without exports");
                    continue;
                }
                for &exported in module_exports {
                    push(&mut edges, program.canonical(exported), EdgeKind::Expand);
                }
            }

            // `export { x }` where `x` aliases a namespace import behaves
            // like a namespace re-export; the specifiers are additionally
            // walked as ordinary identifiers.
            NodeKind::ExportNamed { specifiers } => {
                for &spec in specifiers {
                    let Some(exported) = program.symbol_at(spec) else {
                        continue;
                    };
                    if !program.symbol(exported).is_some_and(|s| s.is_alias()) {
                        continue;
                    }
                    let target = program.canonical(exported);
                    if !program
                        .symbol(target)
                        .is_some_and(|s| s.is_namespace_module)
                    {
                        continue;
                    }
                    for &module_export in program.exports_of_module(target) {
                        push(&mut edges, program.canonical(module_export), EdgeKind::Expand);
                    }
                }
                stack.extend(specifiers.iter().rev());
            }

            NodeKind::Ident(_) => {
                if let Some(referenced) = program.symbol_at(id) {
                    push(&mut edges, program.canonical(referenced), EdgeKind::Expand);
                }
            }

            _ => {
                let children = node.kind.children();
                stack.extend(children.iter().rev());
            }
        }
    }

    edges
}

/// The reachability closure of a program's exported surface.
///
/// Built exactly once per compilation and read-only afterwards; safe to
/// query from multiple concurrent readers.
#[derive(Debug)]
pub struct ExportsSymbolTree {
    roots: HashMap<SymbolId, HashSet<SymbolId>>,
}

impl ExportsSymbolTree {
    /// Compute the closure for the given entry modules.
    ///
    /// An entry module that cannot be located is a fatal configuration
    /// error; an entry module without exports is skipped silently.
    pub fn build<S: AsRef<str>>(program: &Program, entry_files: &[S]) -> SymtrimResult<Self> {
        let mut refs = ReferenceGraph::default();
        let mut roots: HashMap<SymbolId, HashSet<SymbolId>> = HashMap::new();

        for entry in entry_files {
            let entry = entry.as_ref();
            let file_id = program
                .find_file(entry)
                .ok_or_else(|| SymtrimError::configuration(entry))?;

            // A file without any export has no module symbol either.
            let Some(module) = program.file(file_id).and_then(|f| f.module_symbol) else {
                trace!(entry, "entry file has no exports, skipping");
                continue;
            };

            debug!(entry, "processing entry file");
            for &root in program.exports_of_module(module) {
                let closure = closure_for_root(program, &mut refs, root);
                trace!(root = %root, reachable = closure.len(), "computed root closure");
                // Keyed by the raw export symbol: two aliases of the same
                // target are distinct roots with their own closures.
                roots.insert(root, closure);
            }
        }

        Ok(Self { roots })
    }

    /// Whether `symbol` is visible through any root's exported surface.
    ///
    /// Canonicalizes the symbol first, so querying an alias and its target
    /// gives the same answer.
    pub fn is_symbol_accessible_from_exports(&self, program: &Program, symbol: SymbolId) -> bool {
        let symbol = program.canonical(symbol);
        self.roots.values().any(|set| set.contains(&symbol))
    }

    /// Reachability oracle for the renaming consumer.
    pub fn is_reachable(&self, program: &Program, symbol: SymbolId) -> bool {
        self.is_symbol_accessible_from_exports(program, symbol)
    }

    /// Root export symbols, in no particular order.
    pub fn roots(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.roots.keys().copied()
    }

    /// The closure of one root, if it is a root.
    pub fn closure_of(&self, root: SymbolId) -> Option<&HashSet<SymbolId>> {
        self.roots.get(&root)
    }

    /// Number of root export symbols.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Number of distinct symbols reachable from any root.
    pub fn reachable_count(&self) -> usize {
        let mut all: HashSet<SymbolId> = HashSet::new();
        for set in self.roots.values() {
            all.extend(set);
        }
        all.len()
    }
}

/// BFS from one root over the lazily grown reference graph.
///
/// The root (canonicalized) is a member of its own closure, but the walk
/// starts at the raw export symbol: for re-export roots the alias's own
/// declarations are what pull in the re-exported surface. The per-root
/// visited set bounds the walk to each node and edge once, so cyclic and
/// diamond shaped type graphs are handled in linear time.
fn closure_for_root(
    program: &Program,
    refs: &mut ReferenceGraph,
    root: SymbolId,
) -> HashSet<SymbolId> {
    let mut closure = HashSet::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    closure.insert(program.canonical(root));
    visited.insert(root);
    visited.insert(program.canonical(root));
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        refs.ensure_expanded(program, current);
        let targets: Vec<(SymbolId, EdgeKind)> = refs
            .graph
            .edges(current)
            .map(|(_, target, kind)| (target, *kind))
            .collect();
        for (target, kind) in targets {
            closure.insert(target);
            if kind == EdgeKind::Expand && visited.insert(target) {
                queue.push_back(target);
            }
        }
    }

    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;
    use crate::symbols::Symbol;

    /// Entry file exporting `root`, whose declaration references `helper`.
    fn simple_program() -> (Program, SymbolId, SymbolId, SymbolId) {
        let mut b = ProgramBuilder::new();
        let file = b.add_file("src/index.ts", false);
        let module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(file, module);

        let helper = b.add_symbol(Symbol::new("Helper"));
        let helper_name = b.ident_bound(file, "Helper", helper);
        let helper_decl = b.node(
            file,
            NodeKind::ClassDecl {
                name: helper_name,
                members: Vec::new(),
            },
        );
        b.add_declaration(helper, helper_decl);

        let unused = b.add_symbol(Symbol::new("Unused"));

        let root = b.add_symbol(Symbol::new("api"));
        let root_name = b.ident_bound(file, "api", root);
        let param_ty = b.ident_bound(file, "Helper", helper);
        let param_name = b.ident(file, "arg");
        let param = b.node(
            file,
            NodeKind::Param {
                name: param_name,
                type_annotation: Some(param_ty),
            },
        );
        let body = b.node(file, NodeKind::Block(Vec::new()));
        let root_decl = b.node(
            file,
            NodeKind::FuncDecl {
                name: root_name,
                params: vec![param],
                return_type: None,
                body: Some(body),
            },
        );
        b.add_declaration(root, root_decl);
        b.add_statement(file, root_decl);
        b.set_exports(module, vec![root]);

        let program = b.finish().unwrap();
        (program, root, helper, unused)
    }

    #[test]
    fn test_direct_export_is_reachable() {
        let (program, root, _, _) = simple_program();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();
        assert!(tree.is_reachable(&program, root));
        assert_eq!(tree.root_count(), 1);
    }

    #[test]
    fn test_referenced_type_is_reachable() {
        let (program, _, helper, unused) = simple_program();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();
        assert!(tree.is_reachable(&program, helper));
        assert!(!tree.is_reachable(&program, unused));
    }

    #[test]
    fn test_missing_entry_module_is_fatal() {
        let (program, _, _, _) = simple_program();
        let err = ExportsSymbolTree::build(&program, &["src/missing.ts"]).unwrap_err();
        assert!(matches!(err, SymtrimError::Configuration { .. }));
    }

    #[test]
    fn test_entry_without_exports_is_skipped() {
        let mut b = ProgramBuilder::new();
        b.add_file("src/empty.ts", false);
        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/empty.ts"]).unwrap();
        assert_eq!(tree.root_count(), 0);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let (program, root, _, _) = simple_program();
        let first = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();
        let second = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();
        assert_eq!(first.root_count(), second.root_count());
        assert_eq!(first.closure_of(root), second.closure_of(root));
    }

    #[test]
    fn test_variable_type_included_but_not_expanded() {
        let mut b = ProgramBuilder::new();
        let file = b.add_file("src/index.ts", false);
        let module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(file, module);

        // `Deep` is referenced from `Shape`'s declaration; `Shape` is the
        // type of the exported variable. The type itself is included but
        // its declarations are not walked through the variable.
        let deep = b.add_symbol(Symbol::new("Deep"));
        let shape = b.add_symbol(Symbol::new("Shape"));
        let shape_name = b.ident_bound(file, "Shape", shape);
        let deep_ref = b.ident_bound(file, "Deep", deep);
        let shape_decl = b.node(
            file,
            NodeKind::TypeAliasDecl {
                name: shape_name,
                aliased: deep_ref,
            },
        );
        b.add_declaration(shape, shape_decl);

        let value = b.add_symbol(Symbol::new("value"));
        let value_name = b.ident_bound(file, "value", value);
        let init = b.number(file, 1.0);
        let value_decl = b.node(
            file,
            NodeKind::VarDecl {
                name: value_name,
                initializer: Some(init),
            },
        );
        b.set_type(value_decl, shape);
        b.add_declaration(value, value_decl);
        b.add_statement(file, value_decl);
        b.set_exports(module, vec![value]);

        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();

        assert!(tree.is_reachable(&program, shape));
        assert!(
            !tree.is_reachable(&program, deep),
            "type symbols reached through a variable are not expanded"
        );
    }

    #[test]
    fn test_private_member_excluded() {
        let mut b = ProgramBuilder::new();
        let file = b.add_file("src/index.ts", false);
        let module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(file, module);

        let public_dep = b.add_symbol(Symbol::new("PublicDep"));
        let secret_dep = b.add_symbol(Symbol::new("SecretDep"));

        let class_sym = b.add_symbol(Symbol::new("Widget"));
        let class_name = b.ident_bound(file, "Widget", class_sym);

        let pub_name = b.ident(file, "paint");
        let pub_ref = b.ident_bound(file, "PublicDep", public_dep);
        let public_member = b.node(
            file,
            NodeKind::ClassMember {
                name: pub_name,
                is_private: false,
                children: vec![pub_ref],
            },
        );

        let priv_name = b.ident(file, "cache");
        let priv_ref = b.ident_bound(file, "SecretDep", secret_dep);
        let private_member = b.node(
            file,
            NodeKind::ClassMember {
                name: priv_name,
                is_private: true,
                children: vec![priv_ref],
            },
        );

        let class_decl = b.node(
            file,
            NodeKind::ClassDecl {
                name: class_name,
                members: vec![public_member, private_member],
            },
        );
        b.add_declaration(class_sym, class_decl);
        b.add_statement(file, class_decl);
        b.set_exports(module, vec![class_sym]);

        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();

        assert!(tree.is_reachable(&program, class_sym));
        assert!(tree.is_reachable(&program, public_dep));
        assert!(!tree.is_reachable(&program, secret_dep));
    }

    #[test]
    fn test_cyclic_references_terminate() {
        let mut b = ProgramBuilder::new();
        let file = b.add_file("src/index.ts", false);
        let module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(file, module);

        // a -> b -> a
        let a = b.add_symbol(Symbol::new("A"));
        let bee = b.add_symbol(Symbol::new("B"));

        let a_name = b.ident_bound(file, "A", a);
        let b_ref = b.ident_bound(file, "B", bee);
        let a_decl = b.node(
            file,
            NodeKind::TypeAliasDecl {
                name: a_name,
                aliased: b_ref,
            },
        );
        b.add_declaration(a, a_decl);

        let b_name = b.ident_bound(file, "B", bee);
        let a_ref = b.ident_bound(file, "A", a);
        let b_decl = b.node(
            file,
            NodeKind::TypeAliasDecl {
                name: b_name,
                aliased: a_ref,
            },
        );
        b.add_declaration(bee, b_decl);

        b.add_statement(file, a_decl);
        b.set_exports(module, vec![a]);

        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();
        assert!(tree.is_reachable(&program, a));
        assert!(tree.is_reachable(&program, bee));
    }

    #[test]
    fn test_namespace_export_pulls_in_module_surface() {
        let mut b = ProgramBuilder::new();
        let lib = b.add_file("src/lib.ts", false);
        let index = b.add_file("src/index.ts", false);

        let mut lib_module = Symbol::new("\"src/lib\"");
        lib_module.is_namespace_module = true;
        let lib_module = b.add_symbol(lib_module);
        b.set_module_symbol(lib, lib_module);

        let index_module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(index, index_module);

        let f1 = b.add_symbol(Symbol::new("f1"));
        let f1_name = b.ident_bound(lib, "f1", f1);
        let f1_decl = b.node(
            lib,
            NodeKind::FuncDecl {
                name: f1_name,
                params: Vec::new(),
                return_type: None,
                body: None,
            },
        );
        b.add_declaration(f1, f1_decl);
        b.add_statement(lib, f1_decl);

        let f2 = b.add_symbol(Symbol::new("f2"));
        let f2_name = b.ident_bound(lib, "f2", f2);
        let f2_decl = b.node(
            lib,
            NodeKind::FuncDecl {
                name: f2_name,
                params: Vec::new(),
                return_type: None,
                body: None,
            },
        );
        b.add_declaration(f2, f2_decl);
        b.add_statement(lib, f2_decl);

        b.set_exports(lib_module, vec![f1, f2]);

        // export * as ns from './lib'
        let ns = b.add_symbol(Symbol::alias("ns", lib_module));
        let ns_name = b.ident_bound(index, "ns", ns);
        let ns_export = b.node(index, NodeKind::NamespaceExport { name: ns_name });
        b.add_declaration(ns, ns_export);
        b.add_statement(index, ns_export);
        b.set_exports(index_module, vec![ns]);

        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();

        assert!(tree.is_reachable(&program, f1));
        assert!(tree.is_reachable(&program, f2));
        // Querying through the alias gives the same answer as the target.
        assert!(tree.is_reachable(&program, ns));
    }

    #[test]
    fn test_named_reexport_of_namespace_import() {
        let mut b = ProgramBuilder::new();
        let lib = b.add_file("src/lib.ts", false);
        let index = b.add_file("src/index.ts", false);

        let mut lib_module = Symbol::new("\"src/lib\"");
        lib_module.is_namespace_module = true;
        let lib_module = b.add_symbol(lib_module);
        b.set_module_symbol(lib, lib_module);

        let index_module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(index, index_module);

        let f1 = b.add_symbol(Symbol::new("f1"));
        let f1_name = b.ident_bound(lib, "f1", f1);
        let f1_decl = b.node(
            lib,
            NodeKind::FuncDecl {
                name: f1_name,
                params: Vec::new(),
                return_type: None,
                body: None,
            },
        );
        b.add_declaration(f1, f1_decl);
        b.add_statement(lib, f1_decl);
        b.set_exports(lib_module, vec![f1]);

        // import * as x from './lib'; export { x }
        let x = b.add_symbol(Symbol::alias("x", lib_module));
        let spec = b.ident_bound(index, "x", x);
        let export_named = b.node(
            index,
            NodeKind::ExportNamed {
                specifiers: vec![spec],
            },
        );
        b.add_declaration(x, export_named);
        b.add_statement(index, export_named);
        b.set_exports(index_module, vec![x]);

        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();

        // The whole surface of the namespace-imported module is pulled in.
        assert!(tree.is_reachable(&program, f1));
        assert!(tree.is_reachable(&program, x));
    }

    #[test]
    fn test_distinct_alias_roots_keep_separate_closures() {
        let mut b = ProgramBuilder::new();
        let file = b.add_file("src/index.ts", false);
        let module = b.add_symbol(Symbol::new("\"src/index\""));
        b.set_module_symbol(file, module);

        let target = b.add_symbol(Symbol::new("core"));
        let target_name = b.ident_bound(file, "core", target);
        let decl = b.node(
            file,
            NodeKind::FuncDecl {
                name: target_name,
                params: Vec::new(),
                return_type: None,
                body: None,
            },
        );
        b.add_declaration(target, decl);
        b.add_statement(file, decl);

        let first = b.add_symbol(Symbol::alias("first", target));
        let second = b.add_symbol(Symbol::alias("second", target));
        b.set_exports(module, vec![first, second]);

        let program = b.finish().unwrap();
        let tree = ExportsSymbolTree::build(&program, &["src/index.ts"]).unwrap();

        // Both aliases stay distinct roots despite sharing a target.
        assert_eq!(tree.root_count(), 2);
        assert!(tree.closure_of(first).is_some());
        assert!(tree.closure_of(second).is_some());
        assert!(tree.is_reachable(&program, target));
    }
}
