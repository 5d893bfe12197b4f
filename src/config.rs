//! Configuration loading from symtrim.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Options steering one optimizer run.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OptimizerOptions {
    /// File names of the entry modules whose exports seed reachability.
    pub entry_source_files: Vec<String>,
    /// Name prefix marking a symbol internal regardless of export status.
    pub private_prefix: String,
    /// Doc tag that forces a symbol public.
    pub public_doc_tag: String,
    /// Skip rewriting inside decorated declarations.
    pub ignore_decorated: bool,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            entry_source_files: Vec::new(),
            private_prefix: "$_".into(),
            public_doc_tag: "public".into(),
            ignore_decorated: false,
        }
    }
}

/// Loads options from symtrim.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<OptimizerOptions>> {
    let path = root.join("symtrim.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid symtrim.toml")?;
    Ok(Some(cfg))
}
