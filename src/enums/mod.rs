//! Const enum analysis: constant folding and the per-compilation registry.
//!
//! [`EnumEvaluator`] folds member initializer expressions into literal
//! values with ECMAScript numeric semantics; [`ConstEnumRegistry`]
//! discovers every const enumeration in a program and evaluates all of
//! its members up front, so the inlining consumer only does lookups.

pub mod evaluator;
pub mod registry;

pub use evaluator::{create_literal, EnumEvaluator, EnumValue, EvaluationContext, LiteralNode};
pub use registry::{ConstEnumRegistry, EnumInfo, EnumMemberInfo};
