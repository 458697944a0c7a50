use thiserror::Error;

use crate::rule::RuleKind;

/// Errors raised while building or mutating the object model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("operator {operator} cannot be used as a {expected} constraint")]
    OperatorArity {
        operator: String,
        expected: &'static str,
    },

    #[error("{operation} is not defined for {kind} rules")]
    WrongKind {
        operation: &'static str,
        kind: RuleKind,
    },
}

impl ModelError {
    pub fn wrong_kind(operation: &'static str, kind: RuleKind) -> Self {
        ModelError::WrongKind { operation, kind }
    }
}
