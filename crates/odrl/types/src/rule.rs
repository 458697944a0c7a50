//! Rules
//!
//! One [`Rule`] struct covers all four rule kinds. Shared fields live on the
//! struct; the kind-specific payload lives in [`RuleBody`]:
//!
//! | Kind        | Payload                      |
//! |-------------|------------------------------|
//! | Permission  | duties that keep it usable   |
//! | Prohibition | remedies applied on violation|
//! | Duty        | extra actions, consequences  |
//! | Obligation  | extra actions, consequences  |
//!
//! Kind-specific mutators return [`ModelError::WrongKind`] when applied to
//! another kind; the evaluation hooks return `false` instead.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

use crate::constraint::Constraint;
use crate::context::EvaluationContext;
use crate::error::ModelError;
use crate::refinable::{Action, ActionRef, AssetCollection, Identifier, PartyCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Permission,
    Prohibition,
    Duty,
    Obligation,
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Permission => "Permission",
            RuleKind::Prohibition => "Prohibition",
            RuleKind::Duty => "Duty",
            RuleKind::Obligation => "Obligation",
        }
    }

    /// First two letters of the kind name, used in display ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            RuleKind::Permission => "Pe",
            RuleKind::Prohibition => "Pr",
            RuleKind::Duty => "Du",
            RuleKind::Obligation => "Ob",
        }
    }

    pub fn is_duty_like(&self) -> bool {
        matches!(self, RuleKind::Duty | RuleKind::Obligation)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleState {
    #[default]
    Inactive,
    Active,
}

/// Kind-specific payload of a rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum RuleBody {
    Permission {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        duty: Vec<Rule>,
    },
    Prohibition {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        remedy: Vec<Rule>,
    },
    Duty {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        actions: Vec<Action>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        consequence: Vec<Rule>,
    },
    Obligation {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        actions: Vec<Action>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        consequence: Vec<Rule>,
    },
}

impl RuleBody {
    /// Empty payload for `kind`.
    pub fn empty(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Permission => RuleBody::Permission { duty: Vec::new() },
            RuleKind::Prohibition => RuleBody::Prohibition { remedy: Vec::new() },
            RuleKind::Duty => RuleBody::Duty {
                actions: Vec::new(),
                consequence: Vec::new(),
            },
            RuleKind::Obligation => RuleBody::Obligation {
                actions: Vec::new(),
                consequence: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            RuleBody::Permission { .. } => RuleKind::Permission,
            RuleBody::Prohibition { .. } => RuleKind::Prohibition,
            RuleBody::Duty { .. } => RuleKind::Duty,
            RuleBody::Obligation { .. } => RuleKind::Obligation,
        }
    }
}

/// Result of a bounded walk over a duty's consequences
#[derive(Debug, Clone, PartialEq)]
pub struct ConsequenceWalk<'a> {
    /// Consequence duties in breadth-first order
    pub duties: Vec<&'a Rule>,
    /// Whether the depth bound cut the walk short
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub action: ActionRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Identifier<AssetCollection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner: Option<Identifier<PartyCollection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Identifier<PartyCollection>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraint: Vec<Constraint>,
    state: RuleState,
    #[serde(flatten)]
    body: RuleBody,
}

impl Rule {
    pub fn new(kind: RuleKind, action: impl Into<ActionRef>) -> Self {
        Self {
            uid: None,
            action: action.into(),
            target: None,
            assigner: None,
            assignee: None,
            constraint: Vec::new(),
            state: RuleState::default(),
            body: RuleBody::empty(kind),
        }
    }

    pub fn permission(action: impl Into<ActionRef>) -> Self {
        Self::new(RuleKind::Permission, action)
    }

    pub fn prohibition(action: impl Into<ActionRef>) -> Self {
        Self::new(RuleKind::Prohibition, action)
    }

    pub fn duty(action: impl Into<ActionRef>) -> Self {
        Self::new(RuleKind::Duty, action)
    }

    pub fn obligation(action: impl Into<ActionRef>) -> Self {
        Self::new(RuleKind::Obligation, action)
    }

    /// Replace the payload; the rule's kind follows the body.
    pub fn with_body(mut self, body: RuleBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<Identifier<AssetCollection>>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_assigner(mut self, assigner: impl Into<Identifier<PartyCollection>>) -> Self {
        self.assigner = Some(assigner.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<Identifier<PartyCollection>>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint.push(constraint);
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.body.kind()
    }

    pub fn body(&self) -> &RuleBody {
        &self.body
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    pub fn activate(&mut self) {
        trace!(rule = self.label(), kind = %self.kind(), "Rule activated");
        self.state = RuleState::Active;
    }

    pub fn deactivate(&mut self) {
        trace!(rule = self.label(), kind = %self.kind(), "Rule deactivated");
        self.state = RuleState::Inactive;
    }

    pub fn is_active(&self) -> bool {
        self.state == RuleState::Active
    }

    /// Uid if set, otherwise the primary action name.
    pub fn label(&self) -> &str {
        self.uid
            .as_deref()
            .or_else(|| self.action.primary_source())
            .unwrap_or("")
    }

    // --- Constraints (all kinds) ---

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraint.push(constraint);
    }

    /// Remove the first equal constraint; returns whether one was removed.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> bool {
        match self.constraint.iter().position(|c| c == constraint) {
            Some(index) => {
                self.constraint.remove(index);
                true
            }
            None => false,
        }
    }

    // --- Permission ---

    /// Duties of a permission; empty for other kinds.
    pub fn duty_list(&self) -> &[Rule] {
        match &self.body {
            RuleBody::Permission { duty } => duty,
            _ => &[],
        }
    }

    pub fn add_duty(&mut self, duty_rule: Rule) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Permission { duty } => {
                duty.push(duty_rule);
                Ok(())
            }
            other => Err(ModelError::wrong_kind("add_duty", other.kind())),
        }
    }

    pub fn set_duty(&mut self, duties: Vec<Rule>) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Permission { duty } => {
                *duty = duties;
                Ok(())
            }
            other => Err(ModelError::wrong_kind("set_duty", other.kind())),
        }
    }

    pub fn clear_duty(&mut self) -> Result<(), ModelError> {
        self.set_duty(Vec::new())
            .map_err(|_| ModelError::wrong_kind("clear_duty", self.kind()))
    }

    // --- Prohibition ---

    /// Remedies of a prohibition; empty for other kinds.
    pub fn remedy(&self) -> &[Rule] {
        match &self.body {
            RuleBody::Prohibition { remedy } => remedy,
            _ => &[],
        }
    }

    pub fn add_remedy(&mut self, remedy_rule: Rule) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Prohibition { remedy } => {
                remedy.push(remedy_rule);
                Ok(())
            }
            other => Err(ModelError::wrong_kind("add_remedy", other.kind())),
        }
    }

    pub fn set_remedy(&mut self, remedies: Vec<Rule>) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Prohibition { remedy } => {
                *remedy = remedies;
                Ok(())
            }
            other => Err(ModelError::wrong_kind("set_remedy", other.kind())),
        }
    }

    pub fn clear_remedy(&mut self) -> Result<(), ModelError> {
        self.set_remedy(Vec::new())
            .map_err(|_| ModelError::wrong_kind("clear_remedy", self.kind()))
    }

    // --- Duty / Obligation ---

    /// Extra actions of a duty or obligation; empty for other kinds.
    pub fn actions(&self) -> &[Action] {
        match &self.body {
            RuleBody::Duty { actions, .. } | RuleBody::Obligation { actions, .. } => actions,
            _ => &[],
        }
    }

    pub fn add_action(&mut self, action: Action) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Duty { actions, .. } | RuleBody::Obligation { actions, .. } => {
                actions.push(action);
                Ok(())
            }
            other => Err(ModelError::wrong_kind("add_action", other.kind())),
        }
    }

    /// Direct consequences of a duty or obligation; empty for other kinds.
    pub fn consequence(&self) -> &[Rule] {
        match &self.body {
            RuleBody::Duty { consequence, .. } | RuleBody::Obligation { consequence, .. } => {
                consequence
            }
            _ => &[],
        }
    }

    pub fn add_consequence(&mut self, duty: Rule) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Duty { consequence, .. } | RuleBody::Obligation { consequence, .. } => {
                consequence.push(duty);
                Ok(())
            }
            other => Err(ModelError::wrong_kind("add_consequence", other.kind())),
        }
    }

    pub fn set_consequence(&mut self, duties: Vec<Rule>) -> Result<(), ModelError> {
        match &mut self.body {
            RuleBody::Duty { consequence, .. } | RuleBody::Obligation { consequence, .. } => {
                *consequence = duties;
                Ok(())
            }
            other => Err(ModelError::wrong_kind("set_consequence", other.kind())),
        }
    }

    /// Walk consequences breadth-first, at most `max_depth` levels below
    /// this rule.
    pub fn consequence_chain(&self, max_depth: usize) -> ConsequenceWalk<'_> {
        let mut duties = Vec::new();
        let mut truncated = false;
        let mut queue: VecDeque<(&Rule, usize)> =
            self.consequence().iter().map(|d| (d, 1)).collect();

        while let Some((duty, depth)) = queue.pop_front() {
            if depth > max_depth {
                truncated = true;
                continue;
            }
            duties.push(duty);
            queue.extend(duty.consequence().iter().map(|d| (d, depth + 1)));
        }

        ConsequenceWalk { duties, truncated }
    }

    // --- Evaluation hooks ---

    /// A permission is in use while it is active.
    pub fn is_used(&self) -> bool {
        self.kind() == RuleKind::Permission && self.is_active()
    }

    /// A prohibition is violated once a remedy has been attached.
    pub fn is_violated(&self) -> bool {
        self.kind() == RuleKind::Prohibition && !self.remedy().is_empty()
    }

    /// A duty is fulfilled when every one of its constraints holds in
    /// `context`.
    pub fn is_fulfilled(&self, context: &EvaluationContext) -> bool {
        self.kind().is_duty_like()
            && self
                .constraint
                .iter()
                .all(|constraint| constraint.is_satisfied_by(context))
    }
}
