//! `odrl compile`

use anyhow::Context;
use clap::Args;
use odrl_compiler::{Backend, LogicCompiler, Taxonomies, TaxonomyTable};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::commands::load_policies;
use crate::config::{CliConfig, TaxonomyConfig};
use crate::output::{print_json, OutputFormat};

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Policy document (JSON object or array)
    #[arg(short, long)]
    pub policies: PathBuf,

    /// Target language (logic, rego); defaults to the configured backend
    #[arg(short, long)]
    pub backend: Option<Backend>,

    /// Action taxonomy
    #[arg(long)]
    pub actions: Option<PathBuf>,

    /// Actor taxonomy
    #[arg(long)]
    pub actors: Option<PathBuf>,

    /// Purpose taxonomy
    #[arg(long)]
    pub purposes: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Compile every policy and print the rendered rules. Dropped rules are
/// reported through the log.
pub fn execute(args: CompileArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    let policies = load_policies(&args.policies, config)?;

    let files = TaxonomyConfig {
        actions: args.actions.or_else(|| config.taxonomy.actions.clone()),
        actors: args.actors.or_else(|| config.taxonomy.actors.clone()),
        purposes: args.purposes.or_else(|| config.taxonomy.purposes.clone()),
    };
    let taxonomies = load_taxonomies(&files)?;
    let backend = args.backend.unwrap_or(config.compiler.backend);

    let report = LogicCompiler::new(taxonomies)
        .with_backend(backend)
        .compile(&policies);

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for text in report.texts() {
                println!("{}", text);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_taxonomies(files: &TaxonomyConfig) -> anyhow::Result<Taxonomies> {
    Ok(Taxonomies::new(
        table(files.actions.as_deref())?,
        table(files.actors.as_deref())?,
        table(files.purposes.as_deref())?,
    ))
}

/// A missing path is an empty table.
fn table(path: Option<&Path>) -> anyhow::Result<TaxonomyTable> {
    match path {
        Some(path) => {
            let table = TaxonomyTable::load(path).context("failed to load taxonomy")?;
            tracing::debug!(path = %path.display(), entries = table.len(), "Loaded taxonomy");
            Ok(table)
        }
        None => Ok(TaxonomyTable::default()),
    }
}
