//! Rewrite planning: const enum member inlining and declaration cleanup.
//!
//! Walks every source file and produces a [`RewritePlan`], a flat list of
//! actions for the caller's emitter to apply: member accesses replaced by
//! synthesized literals, const enum declarations removed (or stripped to
//! plain enums in declaration files), and import bindings that only named
//! a const enum dropped. Planning never mutates the program; applying the
//! actions is the caller's side of the boundary.
//!
//! An access to an enum whose evaluation failed is left in place with a
//! warning, and its declaration and imports are kept so the output still
//! links.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::ast::{NodeId, NodeKind};
use crate::enums::{create_literal, ConstEnumRegistry, EnumInfo, LiteralNode};
use crate::program::Program;
use crate::symbols::SymbolId;

/// One edit for the caller's emitter.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteAction {
    /// Replace a member access expression with a synthesized literal.
    ReplaceWithLiteral { node: NodeId, literal: LiteralNode },
    /// Delete a const enum declaration statement.
    RemoveEnumDecl { node: NodeId },
    /// Keep the declaration but drop its `const` modifier. Used in
    /// declaration files, which other compilations may still consume.
    StripConstModifier { node: NodeId },
    /// Drop one named import specifier.
    RemoveImportSpecifier { node: NodeId },
    /// Drop an import clause name that only bound a const enum.
    RemoveImportClause { node: NodeId },
}

/// Counters summarizing one planning pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InlineStats {
    /// Member accesses replaced with literals.
    pub inlined: usize,
    /// Const enum declarations scheduled for deletion.
    pub removed_declarations: usize,
    /// Declarations downgraded to plain enums.
    pub stripped_declarations: usize,
    /// Import bindings dropped.
    pub removed_imports: usize,
    /// Accesses to a known const enum that could not be inlined.
    pub misses: usize,
}

/// The full set of edits for one program.
#[derive(Debug, Default)]
pub struct RewritePlan {
    pub actions: Vec<RewriteAction>,
    pub warnings: Vec<String>,
    pub stats: InlineStats,
}

impl RewritePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Plan every const enum rewrite for `program`.
pub fn plan_inlining(program: &Program, registry: &ConstEnumRegistry) -> RewritePlan {
    let mut planner = Planner {
        program,
        registry,
        plan: RewritePlan::default(),
    };

    for (_, file) in program.files() {
        for &stmt in &file.statements {
            planner.plan_statement(stmt, file.is_declaration);
        }
    }

    debug!(
        inlined = planner.plan.stats.inlined,
        removed = planner.plan.stats.removed_declarations,
        stripped = planner.plan.stats.stripped_declarations,
        imports = planner.plan.stats.removed_imports,
        misses = planner.plan.stats.misses,
        "rewrite plan complete"
    );
    planner.plan
}

struct Planner<'p> {
    program: &'p Program,
    registry: &'p ConstEnumRegistry,
    plan: RewritePlan,
}

impl<'p> Planner<'p> {
    fn plan_statement(&mut self, stmt: NodeId, in_declaration_file: bool) {
        let Some(node) = self.program.node(stmt) else {
            return;
        };
        match &node.kind {
            NodeKind::EnumDecl { is_const: true, .. } => {
                self.plan_enum_decl(stmt, in_declaration_file);
            }
            NodeKind::ImportDecl {
                clause_name,
                specifiers,
                ..
            } => {
                self.plan_import(*clause_name, specifiers);
            }
            _ => self.plan_expression_tree(stmt),
        }
    }

    /// A const enum declaration disappears from emitted output once all
    /// of its members inlined cleanly. Declaration files are consumed by
    /// other compilations, so there the modifier is stripped instead.
    fn plan_enum_decl(&mut self, stmt: NodeId, in_declaration_file: bool) {
        let Some(info) = self.registered_enum_for_decl(stmt) else {
            return;
        };
        if !enum_is_clean(info) {
            // Accesses to this enum were left in place; the declaration
            // has to survive with them.
            return;
        }
        if in_declaration_file {
            self.plan
                .actions
                .push(RewriteAction::StripConstModifier { node: stmt });
            self.plan.stats.stripped_declarations += 1;
        } else {
            self.plan
                .actions
                .push(RewriteAction::RemoveEnumDecl { node: stmt });
            self.plan.stats.removed_declarations += 1;
        }
    }

    fn registered_enum_for_decl(&self, stmt: NodeId) -> Option<&'p EnumInfo> {
        let node = self.program.node(stmt)?;
        let NodeKind::EnumDecl { name, .. } = &node.kind else {
            return None;
        };
        let symbol = self.program.symbol_at(*name)?;
        self.registry.get_enum_info(self.program, symbol)
    }

    fn plan_import(&mut self, clause_name: Option<NodeId>, specifiers: &[NodeId]) {
        if let Some(clause) = clause_name {
            if self.binds_clean_const_enum(clause) {
                self.plan
                    .actions
                    .push(RewriteAction::RemoveImportClause { node: clause });
                self.plan.stats.removed_imports += 1;
            }
        }
        for &spec in specifiers {
            let Some(node) = self.program.node(spec) else {
                continue;
            };
            let NodeKind::ImportSpecifier { name } = &node.kind else {
                continue;
            };
            if self.binds_clean_const_enum(*name) {
                self.plan
                    .actions
                    .push(RewriteAction::RemoveImportSpecifier { node: spec });
                self.plan.stats.removed_imports += 1;
            }
        }
    }

    /// Whether an import binding names a const enum that inlined cleanly,
    /// making the binding dead after rewriting.
    fn binds_clean_const_enum(&self, name: NodeId) -> bool {
        let Some(symbol) = self.program.resolved_symbol_at(name) else {
            return false;
        };
        if !self.is_const_enum_symbol(symbol) {
            return false;
        }
        self.registry
            .get_enum_info(self.program, symbol)
            .is_some_and(enum_is_clean)
    }

    fn is_const_enum_symbol(&self, symbol: SymbolId) -> bool {
        self.program
            .symbol(self.program.canonical(symbol))
            .is_some_and(|s| s.is_const_enum)
    }

    /// Walk an expression tree looking for member accesses to inline.
    /// Explicit stack; a replaced access is not descended into.
    fn plan_expression_tree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.program.node(id) else {
                continue;
            };
            if let NodeKind::PropertyAccess { base, member } = node.kind {
                if self.plan_member_access(id, base, member) {
                    continue;
                }
            }
            stack.extend(node.kind.children());
        }
    }

    /// Returns true when the access was handled (replaced or reported),
    /// meaning its subtree needs no further walking.
    fn plan_member_access(&mut self, access: NodeId, base: NodeId, member: NodeId) -> bool {
        let Some(enum_symbol) = self.enum_symbol_of_base(base) else {
            return false;
        };
        let Some(member_name) = self
            .program
            .node(member)
            .and_then(|n| n.kind.ident_text())
            .map(str::to_owned)
        else {
            return false;
        };
        let Some(enum_name) = self
            .program
            .symbol(enum_symbol)
            .map(|s| s.name.clone())
        else {
            return false;
        };

        match self.registry.get_member_value(&enum_name, &member_name) {
            Some(value) => {
                self.plan.actions.push(RewriteAction::ReplaceWithLiteral {
                    node: access,
                    literal: create_literal(value),
                });
                self.plan.stats.inlined += 1;
                true
            }
            None => {
                let message = format!(
                    "cannot inline {enum_name}.{member_name}: no evaluated value"
                );
                warn!(access = %message);
                self.plan.warnings.push(message);
                self.plan.stats.misses += 1;
                true
            }
        }
    }

    /// The canonical const enum symbol behind an access base, if any.
    ///
    /// The front-end's type answer is authoritative; a direct symbol
    /// resolution of the base covers aliased references in positions the
    /// type query has no answer for.
    fn enum_symbol_of_base(&self, base: NodeId) -> Option<SymbolId> {
        let typed = self
            .program
            .type_of(base)
            .map(|t| self.program.canonical(t))
            .filter(|&t| self.is_const_enum_symbol(t));
        if typed.is_some() {
            return typed;
        }
        self.program
            .resolved_symbol_at(base)
            .filter(|&s| self.is_const_enum_symbol(s))
    }
}

fn enum_is_clean(info: &EnumInfo) -> bool {
    info.members().all(|m| m.value.is_some())
}
