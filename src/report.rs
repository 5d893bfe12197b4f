//! Output formatting - plaintext and JSON summaries of an analysis run.

use serde_json::json;

use crate::enums::ConstEnumRegistry;
use crate::exports::ExportsSymbolTree;
#[cfg(feature = "inline")]
use crate::inline::InlineStats;

/// Aggregated numbers of one optimizer run.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalysisSummary {
    pub root_exports: usize,
    pub reachable_symbols: usize,
    pub const_enums: usize,
    pub evaluation_errors: usize,
    pub inlined: usize,
    pub removed_declarations: usize,
    pub removed_imports: usize,
    pub inline_misses: usize,
}

impl AnalysisSummary {
    pub fn new(tree: &ExportsSymbolTree, registry: &ConstEnumRegistry) -> Self {
        Self {
            root_exports: tree.root_count(),
            reachable_symbols: tree.reachable_count(),
            const_enums: registry.get_enum_count(),
            evaluation_errors: registry.evaluation_errors().len(),
            ..Self::default()
        }
    }

    /// Fold the rewrite counters in. Stripped declarations count as
    /// removed for reporting purposes.
    #[cfg(feature = "inline")]
    pub fn with_rewrites(mut self, stats: &InlineStats) -> Self {
        self.inlined = stats.inlined;
        self.removed_declarations = stats.removed_declarations + stats.stripped_declarations;
        self.removed_imports = stats.removed_imports;
        self.inline_misses = stats.misses;
        self
    }
}

/// Prints the summary in plain text format.
pub fn print_plain(summary: &AnalysisSummary) {
    println!(
        "EXPORT SURFACE: {} roots, {} reachable symbols",
        summary.root_exports, summary.reachable_symbols
    );
    println!(
        "CONST ENUMS: {} registered, {} evaluation errors",
        summary.const_enums, summary.evaluation_errors
    );
    println!(
        "REWRITES: {} inlined, {} declarations removed, {} imports removed, {} misses",
        summary.inlined, summary.removed_declarations, summary.removed_imports, summary.inline_misses
    );
}

/// Prints the summary in JSON format.
///
/// Falls back to plain output if serialization fails, which cannot happen
/// for a map of counters but is handled anyway.
pub fn print_json(summary: &AnalysisSummary) {
    let value = json!({
        "exports": {
            "roots": summary.root_exports,
            "reachable": summary.reachable_symbols,
        },
        "const_enums": {
            "registered": summary.const_enums,
            "evaluation_errors": summary.evaluation_errors,
        },
        "rewrites": {
            "inlined": summary.inlined,
            "removed_declarations": summary.removed_declarations,
            "removed_imports": summary.removed_imports,
            "misses": summary.inline_misses,
        },
    });
    match serde_json::to_string_pretty(&value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            print_plain(summary);
        }
    }
}
