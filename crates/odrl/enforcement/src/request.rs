//! Access requests
//!
//! The (action, target, assigner, assignee) tuple being decided, plus the
//! attributes observed at decision time.

use odrl_types::{EvaluationContext, Value};
use serde::{Deserialize, Serialize};

/// A candidate action awaiting a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Requested action name
    pub action: String,

    /// Asset identifier
    pub target: String,

    /// Party granting the rights
    pub assigner: String,

    /// Party receiving the rights; `None` matches any assignee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Attributes for constraint and duty evaluation
    #[serde(default)]
    pub context: EvaluationContext,
}

impl AccessRequest {
    pub fn new(
        action: impl Into<String>,
        target: impl Into<String>,
        assigner: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            assigner: assigner.into(),
            assignee: None,
            context: EvaluationContext::default(),
        }
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Replace the evaluation context
    pub fn with_context(mut self, context: EvaluationContext) -> Self {
        self.context = context;
        self
    }

    /// Add one observed attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(name, value);
        self
    }
}
