//! Decision engine
//!
//! Rules are selected by exact match on target and assigner, optional match
//! on assignee, and action-name match. The first matching rule across all
//! policies (in policy order, then declaration order) decides a check.

use odrl_types::{EvaluationContext, Policy, Rule, RuleKind};
use tracing::{debug, info};

use crate::decision::{Decision, NO_APPLICABLE_PERMISSION};
use crate::request::AccessRequest;

/// A rule selected by a check, with the policy that holds it
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub policy: &'a Policy,
    pub rule: &'a Rule,
}

/// Enforcement engine over a fixed set of policies
#[derive(Debug, Clone, Default)]
pub struct PolicyEnforcement {
    policies: Vec<Policy>,
}

impl PolicyEnforcement {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Whether some permission matches the tuple.
    pub fn check_permission(
        &self,
        action: &str,
        target: &str,
        assigner: &str,
        assignee: Option<&str>,
    ) -> bool {
        self.find_rule(RuleKind::Permission, action, target, assigner, assignee)
            .is_some()
    }

    /// Whether some prohibition matches the tuple.
    pub fn check_prohibition(
        &self,
        action: &str,
        target: &str,
        assigner: &str,
        assignee: Option<&str>,
    ) -> bool {
        self.find_rule(RuleKind::Prohibition, action, target, assigner, assignee)
            .is_some()
    }

    /// First rule of `kind` matching the tuple.
    pub fn find_rule(
        &self,
        kind: RuleKind,
        action: &str,
        target: &str,
        assigner: &str,
        assignee: Option<&str>,
    ) -> Option<RuleMatch<'_>> {
        self.policies.iter().find_map(|policy| {
            policy
                .rules_of(kind)
                .iter()
                .find(|rule| rule_matches(rule, action, target, assigner, assignee))
                .map(|rule| {
                    debug!(
                        policy = %policy.uid,
                        rule = rule.label(),
                        kind = %kind,
                        action,
                        "Matched rule"
                    );
                    RuleMatch { policy, rule }
                })
        })
    }

    /// Decide a request.
    ///
    /// A matching permission wins over any prohibition, but only yields
    /// Permitted when its constraints hold and its duties are fulfilled in
    /// the request context; otherwise the result is Undetermined with the
    /// reason. Without a matching permission, a matching prohibition gives
    /// Prohibited, and anything else is Undetermined.
    pub fn enforce(&self, request: &AccessRequest) -> Decision {
        let assignee = request.assignee.as_deref();

        let decision = if let Some(found) = self.find_rule(
            RuleKind::Permission,
            &request.action,
            &request.target,
            &request.assigner,
            assignee,
        ) {
            gate_permission(found, &request.context)
        } else if let Some(found) = self.find_rule(
            RuleKind::Prohibition,
            &request.action,
            &request.target,
            &request.assigner,
            assignee,
        ) {
            Decision::prohibited(&found.policy.uid, found.rule.label())
        } else {
            Decision::undetermined(NO_APPLICABLE_PERMISSION)
        };

        info!(
            action = %request.action,
            target = %request.target,
            assigner = %request.assigner,
            outcome = %decision.outcome(),
            reason = decision.reason().unwrap_or(""),
            "Enforcement decision"
        );
        decision
    }

    /// Decide a tuple with an empty context.
    pub fn enforce_action(
        &self,
        action: &str,
        target: &str,
        assigner: &str,
        assignee: Option<&str>,
    ) -> Decision {
        let mut request = AccessRequest::new(action, target, assigner);
        request.assignee = assignee.map(str::to_string);
        self.enforce(&request)
    }
}

fn rule_matches(
    rule: &Rule,
    action: &str,
    target: &str,
    assigner: &str,
    assignee: Option<&str>,
) -> bool {
    let target_matches = rule.target.as_ref().is_some_and(|t| t.matches(target));
    let assigner_matches = rule.assigner.as_ref().is_some_and(|a| a.matches(assigner));
    let assignee_matches = match assignee {
        Some(wanted) => rule.assignee.as_ref().is_some_and(|a| a.matches(wanted)),
        None => true,
    };
    target_matches && assigner_matches && assignee_matches && rule.action.matches(action)
}

/// Downgrade a matched permission to Undetermined when a constraint fails
/// or a duty is unmet.
fn gate_permission(found: RuleMatch<'_>, context: &EvaluationContext) -> Decision {
    let RuleMatch { policy, rule } = found;

    // Query constraints annotate the target for compilation only.
    if let Some(failed) = rule
        .constraint
        .iter()
        .filter(|constraint| !constraint.is_query())
        .find(|constraint| !constraint.is_satisfied_by(context))
    {
        let subject = failed
            .left_operand()
            .map(str::to_string)
            .unwrap_or_else(|| failed.operator().to_string());
        return Decision::undetermined(format!("constraint not satisfied: {}", subject));
    }

    if let Some(unmet) = rule
        .duty_list()
        .iter()
        .find(|duty| !duty.is_fulfilled(context))
    {
        return Decision::undetermined(format!("duty not fulfilled: {}", unmet.label()));
    }

    Decision::permitted(&policy.uid, rule.label())
}
