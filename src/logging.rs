//! Structured logging via **tracing**.
//!
//! The analyses emit an informational trace channel (construction progress,
//! duplicate registrations, inlining misses); correctness never depends on
//! it. The JSON subscriber provides machine-readable output for build
//! pipeline observability.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing collector (subscriber).
///
/// This should be called *once* at the beginning of the embedding build
/// pipeline. It configures structured JSON output to stderr.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=symtrim=debug`)
pub fn init_structured_logging() {
    init_with_filter(EnvFilter::from_default_env());
}

/// Initializes logging with an explicit verbosity toggle.
///
/// Verbose mode enables the full per-symbol/per-member trace channel for
/// this crate; otherwise only warnings surface. `RUST_LOG` is ignored.
pub fn init_verbose_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("symtrim=trace")
    } else {
        EnvFilter::new("symtrim=warn")
    };
    init_with_filter(filter);
}

fn init_with_filter(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
