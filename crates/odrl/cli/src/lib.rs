//! ODRL CLI - command-line front end for the policy engine
//!
//! - `enforce`: decide one request against a policy document
//! - `compile`: render policies in the logic or rule-language form
//! - `check`: decode a document and summarize it
//!
//! Command output goes to stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use commands::{check, compile, enforce};
use crate::config::{CliConfig, LoggingConfig};
pub use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "odrl")]
#[command(about = "ODRL - rights-expression policy enforcement and compilation", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ODRL_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides configuration)
    #[arg(long, env = "ODRL_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether an action is permitted (exit 0 permitted, 2 prohibited, 3 undetermined)
    Enforce(enforce::EnforceArgs),

    /// Compile policies into logic or rule-language expressions
    Compile(compile::CompileArgs),

    /// Decode a policy document and summarize it
    Check(check::CheckArgs),
}

/// Run using the current process arguments.
pub fn run() -> anyhow::Result<ExitCode> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> anyhow::Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.log_json {
        config.logging.json = true;
    }
    init_tracing(&config.logging);

    match cli.command {
        Commands::Enforce(args) => enforce::execute(args, &config),
        Commands::Compile(args) => compile::execute(args, &config),
        Commands::Check(args) => check::execute(args, &config),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
