//! Subcommand implementations

pub mod check;
pub mod compile;
pub mod enforce;

use anyhow::Context;
use odrl_parser::{ParserOptions, PolicyParser};
use odrl_types::Policy;
use std::path::Path;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliError;

/// Read and decode a policy document.
pub(crate) fn load_policies(path: &Path, config: &CliConfig) -> anyhow::Result<Vec<Policy>> {
    let raw = std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))?;
    let parser = PolicyParser::new(ParserOptions::default().with_max_depth(config.parser.max_depth));
    let policies = parser
        .parse_str(&raw)
        .with_context(|| format!("invalid policy document {}", path.display()))?;
    debug!(path = %path.display(), policies = policies.len(), "Loaded policies");
    Ok(policies)
}
