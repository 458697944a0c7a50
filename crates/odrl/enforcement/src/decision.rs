//! Enforcement decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason given when no permission applies to a request.
pub const NO_APPLICABLE_PERMISSION: &str = "No applicable permission found";

/// Bare outcome of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Permitted,
    Prohibited,
    Undetermined,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Permitted => write!(f, "Permitted"),
            Outcome::Prohibited => write!(f, "Prohibited"),
            Outcome::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// Enforcement decision
///
/// Permitted and Prohibited name the policy and rule that decided them.
/// Undetermined is the default-deny outcome and always carries a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision")]
pub enum Decision {
    Permitted { policy: String, rule: String },
    Prohibited { policy: String, rule: String },
    Undetermined { reason: String },
}

impl Decision {
    pub fn permitted(policy: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Permitted {
            policy: policy.into(),
            rule: rule.into(),
        }
    }

    pub fn prohibited(policy: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Prohibited {
            policy: policy.into(),
            rule: rule.into(),
        }
    }

    pub fn undetermined(reason: impl Into<String>) -> Self {
        Self::Undetermined {
            reason: reason.into(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Permitted { .. } => Outcome::Permitted,
            Self::Prohibited { .. } => Outcome::Prohibited,
            Self::Undetermined { .. } => Outcome::Undetermined,
        }
    }

    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted { .. })
    }

    pub fn is_prohibited(&self) -> bool {
        matches!(self, Self::Prohibited { .. })
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, Self::Undetermined { .. })
    }

    /// Reason for an undetermined decision
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Undetermined { reason } => Some(reason),
            _ => None,
        }
    }

    /// Policy that decided the outcome (if any)
    pub fn policy(&self) -> Option<&str> {
        match self {
            Self::Permitted { policy, .. } | Self::Prohibited { policy, .. } => Some(policy),
            Self::Undetermined { .. } => None,
        }
    }

    /// Rule that decided the outcome (if any)
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::Permitted { rule, .. } | Self::Prohibited { rule, .. } => Some(rule),
            Self::Undetermined { .. } => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetermined { reason } => write!(f, "Undetermined ({})", reason),
            decided => write!(f, "{}", decided.outcome()),
        }
    }
}
