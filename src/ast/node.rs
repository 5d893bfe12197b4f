//! The sealed node kind union supplied by the front-end.
//!
//! Every syntactic shape the analyses care about is one variant of
//! [`NodeKind`]; matching on it is checked for exhaustiveness at build time,
//! so adding a node shape forces every walker to take a position on it.
//! Child links are [`NodeId`] handles into the owning arena.

use super::arena::{NodeId, Span};

/// Prefix unary operators accepted in constant expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
    /// `~x`
    Tilde,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Tilde => "~",
        }
    }
}

/// Binary operators accepted in constant expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Xor,
    Shl,
    Shr,
    ShrUnsigned,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "|",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::ShrUnsigned => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
        }
    }
}

/// One node of the front-end's parse tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Sealed tagged union of node shapes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Identifier reference; resolution to a symbol is the program's job.
    Ident(String),
    NumberLit(f64),
    StringLit(String),
    BoolLit(bool),
    NullLit,
    /// Template literal parts; never evaluable.
    TemplateLit(Vec<NodeId>),
    ArrayLit(Vec<NodeId>),
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Paren(NodeId),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    /// `base.member` where `member` is an `Ident`.
    PropertyAccess {
        base: NodeId,
        member: NodeId,
    },
    Block(Vec<NodeId>),
    DocComment(String),
    /// `let`/`const` statement holding one or more declarations.
    VarStatement(Vec<NodeId>),
    VarDecl {
        name: NodeId,
        initializer: Option<NodeId>,
    },
    Param {
        name: NodeId,
        type_annotation: Option<NodeId>,
    },
    FuncDecl {
        name: NodeId,
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: Option<NodeId>,
    },
    ClassDecl {
        name: NodeId,
        members: Vec<NodeId>,
    },
    ClassMember {
        name: NodeId,
        is_private: bool,
        children: Vec<NodeId>,
    },
    TypeAliasDecl {
        name: NodeId,
        aliased: NodeId,
    },
    EnumDecl {
        name: NodeId,
        members: Vec<NodeId>,
        is_const: bool,
        is_exported: bool,
    },
    EnumMember {
        name: NodeId,
        initializer: Option<NodeId>,
    },
    /// `export * as name from module` — `name` resolves to an alias symbol
    /// whose target is the re-exported module.
    NamespaceExport {
        name: NodeId,
    },
    /// `export { a, b }` — specifiers are `Ident` nodes.
    ExportNamed {
        specifiers: Vec<NodeId>,
    },
    ImportDecl {
        module: String,
        clause_name: Option<NodeId>,
        specifiers: Vec<NodeId>,
    },
    ImportSpecifier {
        name: NodeId,
    },
}

impl NodeKind {
    /// Short stable name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Ident(_) => "identifier",
            NodeKind::NumberLit(_) => "numeric literal",
            NodeKind::StringLit(_) => "string literal",
            NodeKind::BoolLit(true) => "true",
            NodeKind::BoolLit(false) => "false",
            NodeKind::NullLit => "null",
            NodeKind::TemplateLit(_) => "template literal",
            NodeKind::ArrayLit(_) => "array literal",
            NodeKind::Call { .. } => "call expression",
            NodeKind::Paren(_) => "parenthesized expression",
            NodeKind::Unary { .. } => "unary expression",
            NodeKind::Binary { .. } => "binary expression",
            NodeKind::PropertyAccess { .. } => "property access",
            NodeKind::Block(_) => "block",
            NodeKind::DocComment(_) => "doc comment",
            NodeKind::VarStatement(_) => "variable statement",
            NodeKind::VarDecl { .. } => "variable declaration",
            NodeKind::Param { .. } => "parameter",
            NodeKind::FuncDecl { .. } => "function declaration",
            NodeKind::ClassDecl { .. } => "class declaration",
            NodeKind::ClassMember { .. } => "class member",
            NodeKind::TypeAliasDecl { .. } => "type alias",
            NodeKind::EnumDecl { .. } => "enum declaration",
            NodeKind::EnumMember { .. } => "enum member",
            NodeKind::NamespaceExport { .. } => "namespace export",
            NodeKind::ExportNamed { .. } => "named export",
            NodeKind::ImportDecl { .. } => "import declaration",
            NodeKind::ImportSpecifier { .. } => "import specifier",
        }
    }

    /// Identifier text, if this node is an identifier.
    pub fn ident_text(&self) -> Option<&str> {
        match self {
            NodeKind::Ident(text) => Some(text),
            _ => None,
        }
    }

    /// Child handles in source order.
    ///
    /// Used by generic walkers; shape-specific rules (blocks, private
    /// members, variable declarations) are the walker's responsibility.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Ident(_)
            | NodeKind::NumberLit(_)
            | NodeKind::StringLit(_)
            | NodeKind::BoolLit(_)
            | NodeKind::NullLit
            | NodeKind::DocComment(_) => Vec::new(),
            NodeKind::TemplateLit(parts) => parts.clone(),
            NodeKind::ArrayLit(items) => items.clone(),
            NodeKind::Call { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args);
                out
            }
            NodeKind::Paren(inner) => vec![*inner],
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::PropertyAccess { base, member } => vec![*base, *member],
            NodeKind::Block(stmts) => stmts.clone(),
            NodeKind::VarStatement(decls) => decls.clone(),
            NodeKind::VarDecl { name, initializer } => {
                let mut out = vec![*name];
                out.extend(initializer);
                out
            }
            NodeKind::Param {
                name,
                type_annotation,
            } => {
                let mut out = vec![*name];
                out.extend(type_annotation);
                out
            }
            NodeKind::FuncDecl {
                name,
                params,
                return_type,
                body,
            } => {
                let mut out = vec![*name];
                out.extend(params);
                out.extend(return_type);
                out.extend(body);
                out
            }
            NodeKind::ClassDecl { name, members } => {
                let mut out = vec![*name];
                out.extend(members);
                out
            }
            NodeKind::ClassMember { name, children, .. } => {
                let mut out = vec![*name];
                out.extend(children);
                out
            }
            NodeKind::TypeAliasDecl { name, aliased } => vec![*name, *aliased],
            NodeKind::EnumDecl { name, members, .. } => {
                let mut out = vec![*name];
                out.extend(members);
                out
            }
            NodeKind::EnumMember { name, initializer } => {
                let mut out = vec![*name];
                out.extend(initializer);
                out
            }
            NodeKind::NamespaceExport { name } => vec![*name],
            NodeKind::ExportNamed { specifiers } => specifiers.clone(),
            NodeKind::ImportDecl {
                clause_name,
                specifiers,
                ..
            } => {
                let mut out = Vec::new();
                out.extend(clause_name);
                out.extend(specifiers);
                out
            }
            NodeKind::ImportSpecifier { name } => vec![*name],
        }
    }
}
