//! `odrl enforce`

use clap::Args;
use odrl_enforcement::{AccessRequest, Outcome, PolicyEnforcement};
use odrl_types::Value;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::load_policies;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::print_json;

#[derive(Debug, Args)]
pub struct EnforceArgs {
    /// Policy document (JSON object or array)
    #[arg(short, long)]
    pub policies: PathBuf,

    /// Requested action
    #[arg(long)]
    pub action: String,

    /// Target asset
    #[arg(long)]
    pub target: String,

    /// Assigner party
    #[arg(long)]
    pub assigner: String,

    /// Assignee party; any assignee matches when omitted
    #[arg(long)]
    pub assignee: Option<String>,

    /// Observed attribute for constraint evaluation (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, Value)>,
}

/// Decide the request and print the decision. Exit code follows the outcome.
pub fn execute(args: EnforceArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    let policies = load_policies(&args.policies, config)?;
    let engine = PolicyEnforcement::new(policies);

    let mut request = AccessRequest::new(args.action, args.target, args.assigner);
    request.assignee = args.assignee;
    for (name, value) in args.attributes {
        request = request.with_attribute(name, value);
    }

    let decision = engine.enforce(&request);
    print_json(&decision)?;
    Ok(exit_code(decision.outcome()))
}

pub fn exit_code(outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::Permitted => ExitCode::SUCCESS,
        Outcome::Prohibited => ExitCode::from(2),
        Outcome::Undetermined => ExitCode::from(3),
    }
}

fn parse_attribute(raw: &str) -> Result<(String, Value), CliError> {
    let (name, value) = raw
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| CliError::InvalidAttribute(raw.to_string()))?;
    Ok((name.trim().to_string(), Value::parse_literal(value)))
}
