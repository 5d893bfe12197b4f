//! Const enum discovery and member evaluation.
//!
//! Scans every non-declaration source file for top-level `const` enum
//! declarations, evaluates all members in declaration order, and exposes
//! name/member lookup to the inlining consumer. Built once per
//! compilation; immutable afterwards, so all reads are safe under
//! concurrent readers.
//!
//! Error isolation: an evaluation failure poisons only the enum it
//! occurred in — the enum stays registered, its member values are cleared
//! (degrading inlining to a warn-and-skip for those accesses), the
//! positioned error is retained, and scanning continues with the other
//! enumerations.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ast::{NodeId, NodeKind, SourceFileId};
use crate::error::SymtrimError;
use crate::program::Program;
use crate::symbols::SymbolId;

use super::evaluator::{EnumEvaluator, EnumValue, EvaluationContext};

/// One evaluated (or failed) enum member.
#[derive(Debug, Clone)]
pub struct EnumMemberInfo {
    pub name: String,
    pub declaration: NodeId,
    /// Evaluated value, or `None` when evaluation of the owning enum failed.
    pub value: Option<EnumValue>,
}

/// One registered const enumeration.
#[derive(Debug, Clone)]
pub struct EnumInfo {
    /// The owning enum declaration node.
    pub declaration: NodeId,
    /// File the declaration lives in.
    pub file: SourceFileId,
    pub is_exported: bool,
    members: HashMap<String, EnumMemberInfo>,
    member_order: Vec<String>,
}

impl EnumInfo {
    fn new(declaration: NodeId, file: SourceFileId, is_exported: bool) -> Self {
        Self {
            declaration,
            file,
            is_exported,
            members: HashMap::new(),
            member_order: Vec::new(),
        }
    }

    fn insert_member(&mut self, info: EnumMemberInfo) {
        self.member_order.push(info.name.clone());
        self.members.insert(info.name.clone(), info);
    }

    fn clear_values(&mut self) {
        for member in self.members.values_mut() {
            member.value = None;
        }
    }

    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&EnumMemberInfo> {
        self.members.get(name)
    }

    /// Members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &EnumMemberInfo> {
        self.member_order.iter().filter_map(|n| self.members.get(n))
    }

    pub fn member_count(&self) -> usize {
        self.member_order.len()
    }
}

/// Per-compilation registry of const enumerations.
#[derive(Debug, Default)]
pub struct ConstEnumRegistry {
    enums: HashMap<String, EnumInfo>,
    /// Registration order, for deterministic iteration.
    order: Vec<String>,
    /// Evaluation errors, one per poisoned enum.
    errors: Vec<SymtrimError>,
}

impl ConstEnumRegistry {
    /// Discover and evaluate every const enumeration in the program.
    pub fn build(program: &Program) -> Self {
        let mut registry = Self::default();

        for (file_id, file) in program.files() {
            // Ambient files only describe shapes; their enums are handled
            // by the rewrite consumer, not the registry.
            if file.is_declaration {
                continue;
            }
            for &stmt in &file.statements {
                registry.register_from_statement(program, file_id, stmt);
            }
        }

        debug!(
            enums = registry.order.len(),
            failed = registry.errors.len(),
            "const enum registry built"
        );
        registry
    }

    fn register_from_statement(&mut self, program: &Program, file: SourceFileId, stmt: NodeId) {
        let Some(node) = program.node(stmt) else {
            return;
        };
        let NodeKind::EnumDecl {
            name,
            members,
            is_const: true,
            is_exported,
        } = &node.kind
        else {
            return;
        };

        let Some(symbol) = program.symbol_at(*name) else {
            return;
        };
        let canonical = program.canonical(symbol);
        let Some(entry) = program.symbol(canonical) else {
            return;
        };
        if !entry.is_const_enum {
            return;
        }

        let enum_name = entry.name.clone();
        if self.enums.contains_key(&enum_name) {
            // First registration wins; later same-named declarations are
            // ignored, not merged.
            warn!(
                enum_name,
                file = program.file_name(file),
                "duplicate const enum declaration ignored"
            );
            return;
        }

        // An enum is exported either through its declaration modifier or
        // by appearing in a module's export list.
        let mut info = EnumInfo::new(stmt, file, *is_exported || entry.is_exported);
        self.evaluate_members(program, &enum_name, members, &mut info);
        self.order.push(enum_name.clone());
        self.enums.insert(enum_name, info);
    }

    /// Evaluate members in declaration order against a fresh context.
    ///
    /// Each evaluated member immediately joins the local environment, so
    /// later members can reference earlier siblings; a reference to a
    /// later sibling fails as an undefined lookup.
    fn evaluate_members(
        &mut self,
        program: &Program,
        enum_name: &str,
        members: &[NodeId],
        info: &mut EnumInfo,
    ) {
        let mut evaluator = EnumEvaluator::new(program);
        evaluator.reset();
        let mut context = EvaluationContext::for_enum();
        let mut failed = false;

        for &member in members {
            let Some(member_name) = self.member_name(program, member) else {
                continue;
            };

            if failed {
                info.insert_member(EnumMemberInfo {
                    name: member_name,
                    declaration: member,
                    value: None,
                });
                continue;
            }

            match evaluator.evaluate_enum_member(member, &context) {
                Ok(value) => {
                    context
                        .local_members
                        .insert(member_name.clone(), value.clone());
                    info.insert_member(EnumMemberInfo {
                        name: member_name,
                        declaration: member,
                        value: Some(value),
                    });
                }
                Err(error) => {
                    warn!(
                        enum_name,
                        member = member_name,
                        %error,
                        "const enum member evaluation failed; enum excluded from inlining"
                    );
                    info.insert_member(EnumMemberInfo {
                        name: member_name,
                        declaration: member,
                        value: None,
                    });
                    info.clear_values();
                    self.errors.push(error);
                    failed = true;
                }
            }
        }
    }

    fn member_name(&self, program: &Program, member: NodeId) -> Option<String> {
        let node = program.node(member)?;
        let NodeKind::EnumMember { name, .. } = &node.kind else {
            return None;
        };
        program
            .node(*name)
            .and_then(|n| n.kind.ident_text())
            .map(str::to_owned)
    }

    /// Look up an enumeration by name.
    pub fn get_enum(&self, enum_name: &str) -> Option<&EnumInfo> {
        self.enums.get(enum_name)
    }

    /// Look up an enumeration by symbol, resolving aliases.
    pub fn get_enum_info(&self, program: &Program, symbol: SymbolId) -> Option<&EnumInfo> {
        let canonical = program.canonical(symbol);
        let name = program.symbol(canonical).map(|s| s.name.as_str())?;
        self.enums.get(name)
    }

    /// Evaluated value of one member, if the enum registered cleanly.
    pub fn get_member_value(&self, enum_name: &str, member_name: &str) -> Option<&EnumValue> {
        self.enums
            .get(enum_name)?
            .member(member_name)?
            .value
            .as_ref()
    }

    /// All registered enumerations, in registration order.
    pub fn get_all_enums(&self) -> Vec<&EnumInfo> {
        self.order.iter().filter_map(|n| self.enums.get(n)).collect()
    }

    /// Number of registered enumerations.
    pub fn get_enum_count(&self) -> usize {
        self.order.len()
    }

    /// Positioned evaluation errors surfaced during construction.
    pub fn evaluation_errors(&self) -> &[SymtrimError] {
        &self.errors
    }
}
