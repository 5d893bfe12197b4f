//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use symtrim::prelude::*;
//! ```
//!
//! This provides the most commonly needed types for export surface
//! analysis without polluting the namespace with rarely-used items.

// Core analysis types
pub use crate::error::{SymtrimError, SymtrimResult};
pub use crate::program::{Program, ProgramBuilder, SourceFile};
pub use crate::symbols::{Symbol, SymbolId, SymbolTable};

// Export reachability
pub use crate::exports::ExportsSymbolTree;

// Const enum analysis
pub use crate::enums::{ConstEnumRegistry, EnumEvaluator, EnumValue};

// Configuration
pub use crate::config::{load_config, OptimizerOptions};

// Rewrite planning
#[cfg(feature = "inline")]
pub use crate::inline::{plan_inlining, RewriteAction, RewritePlan};
