//! Configuration for the odrl CLI
//!
//! Layers, lowest first: built-in defaults, an optional file
//! (`--config` / `ODRL_CONFIG`), then `ODRL_`-prefixed environment
//! variables with `__` between sections (`ODRL_PARSER__MAX_DEPTH=8`).
//! Command-line flags are applied on top by the caller.

use odrl_compiler::Backend;
use odrl_parser::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CliResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Taxonomy tables, JSON arrays of `{ "uri": ..., "label": ... }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub actions: Option<PathBuf>,
    pub actors: Option<PathBuf>,
    pub purposes: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Nesting bound for rule chains and logical constraints
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl CliConfig {
    /// Load configuration from file and environment
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ODRL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
