//! Constant expression evaluation for enum members.
//!
//! A pure, per-call interpreter that folds initializer expressions into
//! literal values. Numeric semantics follow ECMAScript: all arithmetic is
//! `f64`, bitwise operators coerce through ToInt32 (ToUint32 for `>>>`),
//! and shift counts are masked to five bits. Anything outside the
//! supported forms is a positioned fatal error.

use std::collections::HashMap;
use std::fmt;

use crate::ast::{BinaryOp, NodeId, NodeKind, UnaryOp};
use crate::error::{SymtrimError, SymtrimResult};
use crate::program::Program;

/// An evaluated enum member value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    Str(String),
}

impl EnumValue {
    /// ECMAScript-style type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            EnumValue::Number(_) => "number",
            EnumValue::Str(_) => "string",
        }
    }
}

/// Local environment for the enum currently being evaluated.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    /// Already-evaluated members of this enum, by name.
    pub local_members: HashMap<String, EnumValue>,
    /// Whether identifier references to local members are permitted.
    /// True only while evaluating the members of that enum.
    pub allow_enum_references: bool,
}

impl EvaluationContext {
    /// Fresh context with self-reference permitted.
    pub fn for_enum() -> Self {
        Self {
            local_members: HashMap::new(),
            allow_enum_references: true,
        }
    }
}

/// Sequencing state for implicitly valued members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastMember {
    /// Start of the enumeration.
    Unset,
    /// Previous member had a numeric value; carries the running counter.
    Numeric,
    /// Previous member evaluated to a string.
    NonNumeric,
}

/// Evaluates the member initializers of one enumeration.
///
/// Stateless per `evaluate` call; `evaluate_enum_member` additionally
/// tracks the implicit sequencing counter, reset per enumeration.
pub struct EnumEvaluator<'p> {
    program: &'p Program,
    counter: f64,
    last: LastMember,
}

impl<'p> EnumEvaluator<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            counter: 0.0,
            last: LastMember::Unset,
        }
    }

    /// Reset the implicit sequencing state for a new enumeration.
    pub fn reset(&mut self) {
        self.counter = 0.0;
        self.last = LastMember::Unset;
    }

    /// Evaluate one enum member, applying implicit sequencing when it has
    /// no initializer.
    ///
    /// The first uninitialized member is 0; each later uninitialized
    /// member is one past the previous numeric value. A string-valued
    /// member does not advance the counter, and an uninitialized member
    /// directly after it is rejected rather than given a guessed numeric
    /// continuation.
    pub fn evaluate_enum_member(
        &mut self,
        member: NodeId,
        context: &EvaluationContext,
    ) -> SymtrimResult<EnumValue> {
        let Some(node) = self.program.node(member) else {
            return Err(SymtrimError::internal("enum member node out of range"));
        };
        let NodeKind::EnumMember { initializer, .. } = &node.kind else {
            return Err(self.error_at(member, format!("Expected enum member, got {}", node.kind.kind_name())));
        };

        let Some(init) = initializer else {
            return self.implicit_member_value(member);
        };

        let value = self.evaluate(*init, context)?;
        match &value {
            EnumValue::Number(n) => {
                self.counter = *n;
                self.last = LastMember::Numeric;
            }
            EnumValue::Str(_) => {
                self.last = LastMember::NonNumeric;
            }
        }
        Ok(value)
    }

    fn implicit_member_value(&mut self, member: NodeId) -> SymtrimResult<EnumValue> {
        match self.last {
            LastMember::Unset => {
                self.counter = 0.0;
                self.last = LastMember::Numeric;
                Ok(EnumValue::Number(0.0))
            }
            LastMember::Numeric => {
                self.counter += 1.0;
                Ok(EnumValue::Number(self.counter))
            }
            LastMember::NonNumeric => Err(self.error_at(
                member,
                "Implicit member value after a string-valued member is not defined",
            )),
        }
    }

    /// Evaluate a constant expression. Pure and side-effect-free apart
    /// from returning a positioned error.
    pub fn evaluate(&self, expr: NodeId, context: &EvaluationContext) -> SymtrimResult<EnumValue> {
        let Some(node) = self.program.node(expr) else {
            return Err(SymtrimError::internal("expression node out of range"));
        };
        match &node.kind {
            NodeKind::StringLit(text) => Ok(EnumValue::Str(text.clone())),
            NodeKind::NumberLit(value) => Ok(EnumValue::Number(*value)),
            NodeKind::Paren(inner) => self.evaluate(*inner, context),
            NodeKind::Unary { op, operand } => self.evaluate_unary(expr, *op, *operand, context),
            NodeKind::Binary { op, lhs, rhs } => self.evaluate_binary(expr, *op, *lhs, *rhs, context),
            NodeKind::Ident(text) => self.evaluate_identifier(expr, text, context),
            NodeKind::BoolLit(_) | NodeKind::NullLit => Err(self.error_at(
                expr,
                format!("Unsupported literal: {}", node.kind.kind_name()),
            )),
            other => Err(self.error_at(
                expr,
                format!("Cannot evaluate expression: {}", other.kind_name()),
            )),
        }
    }

    fn evaluate_unary(
        &self,
        expr: NodeId,
        op: UnaryOp,
        operand: NodeId,
        context: &EvaluationContext,
    ) -> SymtrimResult<EnumValue> {
        let value = self.evaluate(operand, context)?;
        let EnumValue::Number(n) = value else {
            return Err(self.error_at(
                expr,
                format!(
                    "Unary operator '{}' requires a numeric value, got {}",
                    op.as_str(),
                    value.type_name()
                ),
            ));
        };
        let result = match op {
            UnaryOp::Plus => n,
            UnaryOp::Minus => -n,
            UnaryOp::Tilde => !to_int32(n) as f64,
        };
        Ok(EnumValue::Number(result))
    }

    fn evaluate_binary(
        &self,
        expr: NodeId,
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
        context: &EvaluationContext,
    ) -> SymtrimResult<EnumValue> {
        let left = self.evaluate(lhs, context)?;
        let right = self.evaluate(rhs, context)?;

        // String concatenation is the only non-numeric operation.
        if let (EnumValue::Str(l), EnumValue::Str(r)) = (&left, &right) {
            if op == BinaryOp::Add {
                return Ok(EnumValue::Str(format!("{l}{r}")));
            }
        }

        if let (EnumValue::Number(l), EnumValue::Number(r)) = (&left, &right) {
            let (l, r) = (*l, *r);
            let result = match op {
                BinaryOp::Or => (to_int32(l) | to_int32(r)) as f64,
                BinaryOp::And => (to_int32(l) & to_int32(r)) as f64,
                BinaryOp::Xor => (to_int32(l) ^ to_int32(r)) as f64,
                BinaryOp::Shl => (to_int32(l) << (to_uint32(r) & 31)) as f64,
                BinaryOp::Shr => (to_int32(l) >> (to_uint32(r) & 31)) as f64,
                BinaryOp::ShrUnsigned => (to_uint32(l) >> (to_uint32(r) & 31)) as f64,
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Rem => l % r,
                BinaryOp::Pow => l.powf(r),
            };
            return Ok(EnumValue::Number(result));
        }

        Err(self.error_at(
            expr,
            format!(
                "Cannot evaluate binary '{}' with operand types {} and {}",
                op.as_str(),
                left.type_name(),
                right.type_name()
            ),
        ))
    }

    fn evaluate_identifier(
        &self,
        expr: NodeId,
        text: &str,
        context: &EvaluationContext,
    ) -> SymtrimResult<EnumValue> {
        if !context.allow_enum_references {
            return Err(self.error_at(expr, "Cannot reference an enum member here"));
        }
        match context.local_members.get(text) {
            Some(value) => Ok(value.clone()),
            None => Err(self.error_at(expr, format!("Undefined enum member: {text}"))),
        }
    }

    fn error_at(&self, node: NodeId, message: impl Into<String>) -> SymtrimError {
        match self.program.node(node) {
            Some(n) => SymtrimError::evaluation_at(
                self.program.file_name(n.span.file),
                n.span.line,
                n.span.column,
                message,
            ),
            None => SymtrimError::internal(message.into()),
        }
    }
}

/// ECMAScript ToInt32.
fn to_int32(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let m = n.trunc().rem_euclid(4_294_967_296.0);
    if m >= 2_147_483_648.0 {
        (m - 4_294_967_296.0) as i32
    } else {
        m as i32
    }
}

/// ECMAScript ToUint32.
fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Synthesized literal handed to the external rewrite applier.
///
/// Plain literal nodes cannot encode a negative numeral, so negative
/// values are a unary minus wrapping the literal of the absolute value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralNode {
    Number(f64),
    Minus(Box<LiteralNode>),
    Str(String),
}

/// Synthesize the literal node for an evaluated value.
pub fn create_literal(value: &EnumValue) -> LiteralNode {
    match value {
        EnumValue::Str(text) => LiteralNode::Str(text.clone()),
        EnumValue::Number(n) if *n < 0.0 => {
            LiteralNode::Minus(Box::new(LiteralNode::Number(n.abs())))
        }
        EnumValue::Number(n) => LiteralNode::Number(*n),
    }
}

impl fmt::Display for LiteralNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralNode::Number(n) => {
                // Rust's own float Display spells non-finite values in a
                // way the target language does not parse.
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    write!(f, "{}", if *n < 0.0 { "-Infinity" } else { "Infinity" })
                } else if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            LiteralNode::Minus(inner) => write!(f, "-{inner}"),
            LiteralNode::Str(text) => {
                write!(f, "\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceFileId;
    use crate::program::ProgramBuilder;

    struct Fixture {
        builder: ProgramBuilder,
        file: SourceFileId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut builder = ProgramBuilder::new();
            let file = builder.add_file("src/values.ts", false);
            Self { builder, file }
        }

        fn num(&mut self, v: f64) -> NodeId {
            self.builder.number(self.file, v)
        }

        fn str_lit(&mut self, v: &str) -> NodeId {
            self.builder.string(self.file, v)
        }

        fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
            self.builder.node(self.file, NodeKind::Binary { op, lhs, rhs })
        }

        fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
            self.builder.node(self.file, NodeKind::Unary { op, operand })
        }

        fn eval(self, expr: NodeId) -> SymtrimResult<EnumValue> {
            let program = self.builder.finish().unwrap();
            let evaluator = EnumEvaluator::new(&program);
            evaluator.evaluate(expr, &EvaluationContext::for_enum())
        }
    }

    fn assert_number(result: SymtrimResult<EnumValue>, expected: f64) {
        match result {
            Ok(EnumValue::Number(n)) => assert_eq!(n, expected),
            other => panic!("expected number {expected}, got {other:?}"),
        }
    }

    #[test]
    fn test_literals() {
        let mut fx = Fixture::new();
        let n = fx.num(42.0);
        assert_number(fx.eval(n), 42.0);

        let mut fx = Fixture::new();
        let s = fx.str_lit("hi");
        assert_eq!(fx.eval(s).unwrap(), EnumValue::Str("hi".into()));
    }

    #[test]
    fn test_binary_operator_laws() {
        let cases: &[(BinaryOp, f64, f64, f64)] = &[
            (BinaryOp::Or, 5.0, 3.0, 7.0),
            (BinaryOp::And, 5.0, 3.0, 1.0),
            (BinaryOp::Xor, 5.0, 3.0, 6.0),
            (BinaryOp::Shl, 1.0, 4.0, 16.0),
            (BinaryOp::Shr, -8.0, 1.0, -4.0),
            (BinaryOp::ShrUnsigned, -1.0, 28.0, 15.0),
            (BinaryOp::Add, 2.5, 0.5, 3.0),
            (BinaryOp::Sub, 2.0, 5.0, -3.0),
            (BinaryOp::Mul, 6.0, 7.0, 42.0),
            (BinaryOp::Div, 9.0, 2.0, 4.5),
            (BinaryOp::Rem, 9.0, 2.0, 1.0),
            (BinaryOp::Pow, 2.0, 10.0, 1024.0),
        ];
        for &(op, l, r, expected) in cases {
            let mut fx = Fixture::new();
            let lhs = fx.num(l);
            let rhs = fx.num(r);
            let expr = fx.binary(op, lhs, rhs);
            assert_number(fx.eval(expr), expected);
        }
    }

    #[test]
    fn test_unary_operators() {
        let mut fx = Fixture::new();
        let n = fx.num(5.0);
        let e = fx.unary(UnaryOp::Plus, n);
        assert_number(fx.eval(e), 5.0);

        let mut fx = Fixture::new();
        let n = fx.num(5.0);
        let e = fx.unary(UnaryOp::Minus, n);
        assert_number(fx.eval(e), -5.0);

        let mut fx = Fixture::new();
        let n = fx.num(5.0);
        let e = fx.unary(UnaryOp::Tilde, n);
        assert_number(fx.eval(e), -6.0);
    }

    #[test]
    fn test_parenthesized() {
        let mut fx = Fixture::new();
        let n = fx.num(3.0);
        let p = fx.builder.node(fx.file, NodeKind::Paren(n));
        let two = fx.num(2.0);
        let e = fx.binary(BinaryOp::Mul, p, two);
        assert_number(fx.eval(e), 6.0);
    }

    #[test]
    fn test_string_concatenation() {
        let mut fx = Fixture::new();
        let l = fx.str_lit("foo");
        let r = fx.str_lit("bar");
        let e = fx.binary(BinaryOp::Add, l, r);
        assert_eq!(fx.eval(e).unwrap(), EnumValue::Str("foobar".into()));
    }

    #[test]
    fn test_mixed_operands_rejected() {
        let mut fx = Fixture::new();
        let l = fx.num(1.0);
        let r = fx.str_lit("x");
        let e = fx.binary(BinaryOp::Add, l, r);
        let err = fx.eval(e).unwrap_err();
        assert!(err.to_string().contains("number and string"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unary_on_string_rejected() {
        let mut fx = Fixture::new();
        let s = fx.str_lit("x");
        let e = fx.unary(UnaryOp::Minus, s);
        assert!(fx.eval(e).is_err());
    }

    #[test]
    fn test_boolean_and_null_rejected() {
        let mut fx = Fixture::new();
        let b = fx.builder.node(fx.file, NodeKind::BoolLit(true));
        let err = fx.eval(b).unwrap_err();
        assert!(err.to_string().contains("Unsupported literal"));

        let mut fx = Fixture::new();
        let n = fx.builder.node(fx.file, NodeKind::NullLit);
        assert!(fx.eval(n).is_err());
    }

    #[test]
    fn test_call_rejected_with_position() {
        let mut fx = Fixture::new();
        let callee = fx.builder.ident(fx.file, "f");
        let call = fx.builder.node_at(
            fx.file,
            7,
            12,
            NodeKind::Call {
                callee,
                args: Vec::new(),
            },
        );
        let err = fx.eval(call).unwrap_err();
        assert_eq!(err.location(), Some(("src/values.ts", 7, 12)));
        assert!(err.to_string().contains("Cannot evaluate expression"));
    }

    #[test]
    fn test_identifier_lookup() {
        let mut fx = Fixture::new();
        let reference = fx.builder.ident(fx.file, "A");
        let program = fx.builder.finish().unwrap();
        let evaluator = EnumEvaluator::new(&program);

        let mut ctx = EvaluationContext::for_enum();
        ctx.local_members.insert("A".into(), EnumValue::Number(5.0));
        assert_eq!(
            evaluator.evaluate(reference, &ctx).unwrap(),
            EnumValue::Number(5.0)
        );
    }

    #[test]
    fn test_identifier_undefined_is_fatal() {
        let mut fx = Fixture::new();
        let reference = fx.builder.ident(fx.file, "Later");
        let err = fx.eval(reference).unwrap_err();
        assert!(err.to_string().contains("Undefined enum member: Later"));
    }

    #[test]
    fn test_identifier_blocked_without_self_reference() {
        let mut fx = Fixture::new();
        let reference = fx.builder.ident(fx.file, "A");
        let program = fx.builder.finish().unwrap();
        let evaluator = EnumEvaluator::new(&program);

        let mut ctx = EvaluationContext::default();
        ctx.local_members.insert("A".into(), EnumValue::Number(1.0));
        assert!(evaluator.evaluate(reference, &ctx).is_err());
    }

    #[test]
    fn test_implicit_sequencing() {
        let mut fx = Fixture::new();
        let a = {
            let name = fx.builder.ident(fx.file, "A");
            fx.builder.node(fx.file, NodeKind::EnumMember { name, initializer: None })
        };
        let b = {
            let name = fx.builder.ident(fx.file, "B");
            fx.builder.node(fx.file, NodeKind::EnumMember { name, initializer: None })
        };
        let five = fx.num(5.0);
        let c = {
            let name = fx.builder.ident(fx.file, "C");
            fx.builder.node(
                fx.file,
                NodeKind::EnumMember {
                    name,
                    initializer: Some(five),
                },
            )
        };
        let d = {
            let name = fx.builder.ident(fx.file, "D");
            fx.builder.node(fx.file, NodeKind::EnumMember { name, initializer: None })
        };

        let program = fx.builder.finish().unwrap();
        let mut evaluator = EnumEvaluator::new(&program);
        evaluator.reset();
        let ctx = EvaluationContext::for_enum();

        assert_eq!(
            evaluator.evaluate_enum_member(a, &ctx).unwrap(),
            EnumValue::Number(0.0)
        );
        assert_eq!(
            evaluator.evaluate_enum_member(b, &ctx).unwrap(),
            EnumValue::Number(1.0)
        );
        assert_eq!(
            evaluator.evaluate_enum_member(c, &ctx).unwrap(),
            EnumValue::Number(5.0)
        );
        assert_eq!(
            evaluator.evaluate_enum_member(d, &ctx).unwrap(),
            EnumValue::Number(6.0)
        );
    }

    #[test]
    fn test_implicit_after_string_rejected() {
        let mut fx = Fixture::new();
        let text = fx.str_lit("foo");
        let a = {
            let name = fx.builder.ident(fx.file, "A");
            fx.builder.node(
                fx.file,
                NodeKind::EnumMember {
                    name,
                    initializer: Some(text),
                },
            )
        };
        let b = {
            let name = fx.builder.ident(fx.file, "B");
            fx.builder.node(fx.file, NodeKind::EnumMember { name, initializer: None })
        };

        let program = fx.builder.finish().unwrap();
        let mut evaluator = EnumEvaluator::new(&program);
        evaluator.reset();
        let ctx = EvaluationContext::for_enum();

        assert_eq!(
            evaluator.evaluate_enum_member(a, &ctx).unwrap(),
            EnumValue::Str("foo".into())
        );
        let err = evaluator.evaluate_enum_member(b, &ctx).unwrap_err();
        assert!(err.to_string().contains("string-valued member"));
    }

    #[test]
    fn test_to_int32_wrapping() {
        assert_eq!(to_int32(0.0), 0);
        assert_eq!(to_int32(-1.0), -1);
        assert_eq!(to_int32(2_147_483_648.0), -2_147_483_648);
        assert_eq!(to_int32(4_294_967_296.0), 0);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_uint32(-1.0), u32::MAX);
    }

    #[test]
    fn test_literal_synthesis() {
        assert_eq!(
            create_literal(&EnumValue::Number(3.0)),
            LiteralNode::Number(3.0)
        );
        assert_eq!(
            create_literal(&EnumValue::Number(-4.0)),
            LiteralNode::Minus(Box::new(LiteralNode::Number(4.0)))
        );
        assert_eq!(create_literal(&EnumValue::Number(-4.0)).to_string(), "-4");
        assert_eq!(create_literal(&EnumValue::Number(2.5)).to_string(), "2.5");
        assert_eq!(
            create_literal(&EnumValue::Str("foo".into())).to_string(),
            "\"foo\""
        );
        assert_eq!(
            create_literal(&EnumValue::Str("say \"hi\"".into())).to_string(),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_nonfinite_literal_spellings() {
        // 1/0 and 0/0 style results must render as parseable numerals.
        assert_eq!(
            create_literal(&EnumValue::Number(f64::INFINITY)).to_string(),
            "Infinity"
        );
        assert_eq!(
            create_literal(&EnumValue::Number(f64::NEG_INFINITY)).to_string(),
            "-Infinity"
        );
        assert_eq!(
            create_literal(&EnumValue::Number(f64::NAN)).to_string(),
            "NaN"
        );
    }
}
