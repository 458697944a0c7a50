use odrl_types::{Policy, Rule, RuleKind};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LoweringError;
use crate::lowering::{LoweredRule, Lowering};
use crate::render::Backend;
use crate::taxonomy::Taxonomies;

/// Kinds compiled per policy, in emission order. A policy's `duty` list is
/// not compiled.
const COMPILED_KINDS: [RuleKind; 3] = [
    RuleKind::Prohibition,
    RuleKind::Permission,
    RuleKind::Obligation,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRule {
    pub policy_uid: String,
    pub rule_id: String,
    pub expression: String,
}

/// A rule dropped from the batch, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDiagnostic {
    pub policy_uid: String,
    pub rule_id: String,
    pub rule_uid: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    pub error: LoweringError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    pub expressions: Vec<RenderedRule>,
    pub diagnostics: Vec<RuleDiagnostic>,
}

impl CompileReport {
    /// Rendered expressions in emission order.
    pub fn texts(&self) -> Vec<&str> {
        self.expressions
            .iter()
            .map(|rendered| rendered.expression.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Lowers policies and renders each rule in the selected backend.
///
/// Counters live in a single [`compile`](LogicCompiler::compile) call:
/// display ids restart at 1 for every policy, variables are numbered
/// across the whole call, and a second call starts again from `x0`.
#[derive(Debug, Clone, Default)]
pub struct LogicCompiler {
    taxonomies: Taxonomies,
    backend: Backend,
}

impl LogicCompiler {
    pub fn new(taxonomies: Taxonomies) -> Self {
        Self {
            taxonomies,
            backend: Backend::default(),
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Lower every compiled rule without rendering. Dropped rules are
    /// returned as errors in their emission slot.
    pub fn lower(&self, policies: &[Policy]) -> Vec<Result<LoweredRule, LoweringError>> {
        let mut lowered = Vec::new();
        self.walk(policies, |_, _, _, result| lowered.push(result));
        lowered
    }

    pub fn compile(&self, policies: &[Policy]) -> CompileReport {
        let renderer = self.backend.renderer();
        let mut report = CompileReport::default();

        self.walk(policies, |policy, rule, rule_id, result| match result {
            Ok(lowered) => {
                let expression = renderer.render(&lowered);
                debug!(
                    policy = %policy.uid,
                    rule = %rule_id,
                    backend = %self.backend,
                    "Rendered rule"
                );
                report.expressions.push(RenderedRule {
                    policy_uid: policy.uid.clone(),
                    rule_id,
                    expression,
                });
            }
            Err(error) => {
                warn!(
                    policy = %policy.uid,
                    rule = %rule_id,
                    error = %error,
                    "Dropped rule"
                );
                report.diagnostics.push(RuleDiagnostic {
                    policy_uid: policy.uid.clone(),
                    rule_id,
                    rule_uid: rule.uid.clone(),
                    error,
                });
            }
        });

        info!(
            policies = policies.len(),
            rendered = report.expressions.len(),
            dropped = report.diagnostics.len(),
            backend = %self.backend,
            "Compiled policies"
        );
        report
    }

    /// Visit compiled rules in emission order with their display ids. A
    /// failed rule keeps its id but gives its variables back.
    fn walk<F>(&self, policies: &[Policy], mut visit: F)
    where
        F: FnMut(&Policy, &Rule, String, Result<LoweredRule, LoweringError>),
    {
        let mut lowering = Lowering::new(&self.taxonomies);
        for policy in policies {
            let mut index = 1;
            for kind in COMPILED_KINDS {
                for rule in policy.rules_of(kind) {
                    let rule_id = format!("{}{}", kind.prefix(), index);
                    index += 1;

                    let checkpoint = lowering.next_var();
                    let result = lowering.lower(rule, rule_id.clone());
                    if result.is_err() {
                        lowering.rewind(checkpoint);
                    }
                    visit(policy, rule, rule_id, result);
                }
            }
        }
    }
}

/// Compile with a one-off compiler.
pub fn compile(policies: &[Policy], taxonomies: &Taxonomies, backend: Backend) -> CompileReport {
    LogicCompiler::new(taxonomies.clone())
        .with_backend(backend)
        .compile(policies)
}

fn serialize_display<S: serde::Serializer>(
    error: &LoweringError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odrl_types::{Constraint, Operator};

    fn policy() -> Policy {
        Policy::new("urn:policy:1")
            .with_rule(Rule::permission("read").with_target("http://ex.com/asset#Report"))
            .with_rule(Rule::prohibition("delete").with_target("http://ex.com/asset#Report"))
            .with_rule(Rule::obligation("notify").with_target("http://ex.com/asset#Log"))
            .with_rule(Rule::duty("archive").with_target("http://ex.com/asset#Log"))
    }

    #[test]
    fn emission_order_and_display_ids() {
        let report = LogicCompiler::default().compile(&[policy()]);
        assert_eq!(
            report.texts(),
            vec![
                "Prohibition(Pr1) ∧ hasTarget(Pr1, x0) ∧ Report(x0)",
                "Permission(Pe2) ∧ hasTarget(Pe2, x1) ∧ Report(x1)",
                "Obligation(Ob3) ∧ hasTarget(Ob3, x2) ∧ Log(x2)",
            ]
        );
        assert!(report.is_complete());
    }

    #[test]
    fn display_ids_restart_per_policy() {
        let report = LogicCompiler::default().compile(&[policy(), policy()]);
        let ids: Vec<_> = report.expressions.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["Pr1", "Pe2", "Ob3", "Pr1", "Pe2", "Ob3"]);
        assert!(report.texts()[5].contains("x5"));
    }

    #[test]
    fn dropped_rule_keeps_its_id_and_releases_its_variables() {
        let broken = Rule::permission("share")
            .with_uid("urn:rule:broken")
            .with_target("http://ex.com/asset")
            .with_constraint(Constraint::new(Operator::Eq, 1).unwrap());
        let policy = Policy::new("p")
            .with_rule(broken)
            .with_rule(Rule::permission("read").with_target("http://ex.com/asset"));

        let report = compile(&[policy], &Taxonomies::empty(), Backend::Rego);
        assert_eq!(
            report.texts(),
            vec!["Permission(Pe2) { has_target(Pe2, x0) && asset(x0) }"]
        );
        assert_eq!(report.diagnostics.len(), 1);
        let diagnostic = &report.diagnostics[0];
        assert_eq!(diagnostic.rule_id, "Pe1");
        assert_eq!(diagnostic.rule_uid.as_deref(), Some("urn:rule:broken"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["diagnostics"][0]["error"],
            "eq constraint has no left operand"
        );
    }

    #[test]
    fn lower_matches_compile() {
        let compiler = LogicCompiler::default();
        let lowered = compiler.lower(&[policy()]);
        assert_eq!(lowered.len(), 3);
        assert_eq!(lowered[1].as_ref().unwrap().display_id, "Pe2");
    }
}
