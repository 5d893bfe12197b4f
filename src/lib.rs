//! symtrim: export surface analysis and const enum inlining.
//!
//! This library provides the build-time analyses a bundling pipeline needs
//! to shrink a compiled library's public surface: which symbols are part
//! of the exported contract, and which const enum members can be folded
//! into literals and erased.
//!
//! # Features
//!
//! - **Export reachability**: Transitive closure of the symbols visible
//!   through the entry modules' exports, the oracle for safe renaming
//! - **Const enum evaluation**: ECMAScript-semantics constant folding of
//!   member initializers, including implicit numeric sequencing
//! - **Rewrite planning**: Member accesses replaced with literals, const
//!   enum declarations deleted or stripped, dead import bindings dropped
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use symtrim::prelude::*;
//!
//! let tree = ExportsSymbolTree::build(&program, &options.entry_source_files)?;
//! let registry = ConstEnumRegistry::build(&program);
//! let plan = plan_inlining(&program, &registry);
//! ```
//!
//! # Module Organization
//!
//! - [`ast`]: Arena-allocated node handles and the sealed node kind union
//! - [`symbols`]: Symbol table with memoized alias canonicalization
//! - [`program`]: The immutable per-compilation facade and its builder
//! - [`exports`]: Export reachability closure
//! - [`enums`]: Const enum registry and constant expression evaluator
//! - [`inline`]: Rewrite planning for the inlining consumer
//! - [`config`]: Options loading from symtrim.toml
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `inline` (default): Enable rewrite planning

// Core modules (always available)
pub mod ast;
pub mod config;
pub mod enums;
pub mod error;
pub mod exports;
pub mod logging;
pub mod prelude;
pub mod program;
pub mod report;
pub mod symbols;

// Feature-gated modules
#[cfg(feature = "inline")]
pub mod inline;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{SymtrimError, SymtrimResult};

// Program assembly
pub use program::{Program, ProgramBuilder, SourceFile};

// Symbols
pub use symbols::{Symbol, SymbolId, SymbolTable};

// Export reachability
pub use exports::ExportsSymbolTree;

// Const enum analysis
pub use enums::{create_literal, ConstEnumRegistry, EnumEvaluator, EnumValue, LiteralNode};

// Configuration
pub use config::{load_config, OptimizerOptions};

// Logging
pub use logging::{init_structured_logging, init_verbose_logging};

// Reporting
pub use report::{print_json, print_plain, AnalysisSummary};

// Rewrite planning
#[cfg(feature = "inline")]
pub use inline::{plan_inlining, InlineStats, RewriteAction, RewritePlan};
