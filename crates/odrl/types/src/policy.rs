//! Policies
//!
//! A policy owns four typed rule lists. Rules are filed by kind on
//! [`Policy::add_rule`], so a rule can never sit in the wrong list.

use serde::Serialize;

use crate::rule::{Rule, RuleKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub uid: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
    /// Parent policies; recorded but never merged
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inherit_from: Vec<String>,
    /// Explicit conflict-resolution tag (`perm`, `prohibit`, `invalid`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permission: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prohibition: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub obligation: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duty: Vec<Rule>,
}

impl Policy {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, policy_type: impl Into<String>) -> Self {
        self.policy_type = Some(policy_type.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profiles.push(profile.into());
        self
    }

    pub fn with_inherit_from(mut self, parent: impl Into<String>) -> Self {
        self.inherit_from.push(parent.into());
        self
    }

    pub fn with_conflict(mut self, conflict: impl Into<String>) -> Self {
        self.conflict = Some(conflict.into());
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    /// File a rule into the list matching its kind.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules_of_mut(rule.kind()).push(rule);
    }

    /// Remove the first rule with `uid` from whichever list holds it.
    pub fn remove_rule(&mut self, uid: &str) -> Option<Rule> {
        for kind in [
            RuleKind::Permission,
            RuleKind::Prohibition,
            RuleKind::Obligation,
            RuleKind::Duty,
        ] {
            let list = self.rules_of_mut(kind);
            if let Some(index) = list.iter().position(|r| r.uid.as_deref() == Some(uid)) {
                return Some(list.remove(index));
            }
        }
        None
    }

    pub fn rules_of(&self, kind: RuleKind) -> &[Rule] {
        match kind {
            RuleKind::Permission => &self.permission,
            RuleKind::Prohibition => &self.prohibition,
            RuleKind::Obligation => &self.obligation,
            RuleKind::Duty => &self.duty,
        }
    }

    fn rules_of_mut(&mut self, kind: RuleKind) -> &mut Vec<Rule> {
        match kind {
            RuleKind::Permission => &mut self.permission,
            RuleKind::Prohibition => &mut self.prohibition,
            RuleKind::Obligation => &mut self.obligation,
            RuleKind::Duty => &mut self.duty,
        }
    }

    /// All top-level rules: permissions, prohibitions, obligations, duties.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.permission
            .iter()
            .chain(&self.prohibition)
            .chain(&self.obligation)
            .chain(&self.duty)
    }

    pub fn rule_count(&self) -> usize {
        self.permission.len() + self.prohibition.len() + self.obligation.len() + self.duty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_filed_by_kind() {
        let policy = Policy::new("urn:policy:1")
            .with_type("Set")
            .with_rule(Rule::permission("read").with_uid("r1"))
            .with_rule(Rule::prohibition("share").with_uid("r2"))
            .with_rule(Rule::obligation("delete").with_uid("r3"))
            .with_rule(Rule::duty("pay").with_uid("r4"));

        assert_eq!(policy.permission.len(), 1);
        assert_eq!(policy.prohibition.len(), 1);
        assert_eq!(policy.obligation.len(), 1);
        assert_eq!(policy.duty.len(), 1);
        assert_eq!(policy.rule_count(), 4);
        assert_eq!(policy.rules_of(RuleKind::Obligation)[0].label(), "r3");

        let uids: Vec<&str> = policy.rules().map(|r| r.label()).collect();
        assert_eq!(uids, vec!["r1", "r2", "r3", "r4"]);
    }

    #[test]
    fn remove_rule_by_uid() {
        let mut policy = Policy::new("p")
            .with_rule(Rule::permission("read").with_uid("r1"))
            .with_rule(Rule::prohibition("share").with_uid("r2"));

        let removed = policy.remove_rule("r2");
        assert_eq!(removed.map(|r| r.kind()), Some(RuleKind::Prohibition));
        assert!(policy.remove_rule("r2").is_none());
        assert_eq!(policy.rule_count(), 1);
        assert!(!policy.is_empty());
    }

    #[test]
    fn metadata_builders() {
        let policy = Policy::new("p")
            .with_profile("urn:profile:a")
            .with_inherit_from("urn:policy:parent")
            .with_conflict("prohibit");
        assert_eq!(policy.profiles, vec!["urn:profile:a"]);
        assert_eq!(policy.inherit_from, vec!["urn:policy:parent"]);
        assert_eq!(policy.conflict.as_deref(), Some("prohibit"));
        assert!(policy.is_empty());
    }
}
