//! `odrl check`

use clap::Args;
use odrl_types::{Policy, RuleKind};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::load_policies;
use crate::config::CliConfig;
use crate::output::{print_json, OutputFormat};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Policy document (JSON object or array)
    #[arg(short, long)]
    pub policies: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicySummary {
    uid: String,
    #[serde(rename = "type")]
    policy_type: Option<String>,
    permission: usize,
    prohibition: usize,
    obligation: usize,
    duty: usize,
}

impl PolicySummary {
    fn of(policy: &Policy) -> Self {
        Self {
            uid: policy.uid.clone(),
            policy_type: policy.policy_type.clone(),
            permission: policy.rules_of(RuleKind::Permission).len(),
            prohibition: policy.rules_of(RuleKind::Prohibition).len(),
            obligation: policy.rules_of(RuleKind::Obligation).len(),
            duty: policy.rules_of(RuleKind::Duty).len(),
        }
    }
}

/// Decode the document and summarize it.
pub fn execute(args: CheckArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    let policies = load_policies(&args.policies, config)?;
    let summaries: Vec<PolicySummary> = policies.iter().map(PolicySummary::of).collect();

    match args.format {
        OutputFormat::Json => print_json(&summaries)?,
        OutputFormat::Text => {
            println!("{} policies", summaries.len());
            for summary in &summaries {
                println!(
                    "{}: permission={} prohibition={} obligation={} duty={}",
                    summary.uid,
                    summary.permission,
                    summary.prohibition,
                    summary.obligation,
                    summary.duty
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
