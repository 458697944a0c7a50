use std::path::PathBuf;
use thiserror::Error;

/// Failure to lower a single rule. The rule is dropped; the rest of the
/// batch still compiles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoweringError {
    #[error("rule has no target")]
    MissingTarget,

    #[error("{operator} constraint has no left operand")]
    MissingLeftOperand { operator: String },

    #[error("constraint on {left_operand} has an empty right operand")]
    EmptyRightOperand { left_operand: String },

    #[error("malformed query `{query}`: {reason}")]
    MalformedQuery { query: String, reason: &'static str },
}

impl LoweringError {
    pub fn malformed_query(query: impl Into<String>, reason: &'static str) -> Self {
        LoweringError::MalformedQuery {
            query: query.into(),
            reason,
        }
    }
}

/// Failures outside per-rule lowering: taxonomy loading and backend selection.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to read taxonomy {path}: {source}")]
    TaxonomyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy {path}: {source}")]
    TaxonomyFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown backend `{0}` (expected `logic` or `rego`)")]
    UnknownBackend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowering_messages() {
        assert_eq!(LoweringError::MissingTarget.to_string(), "rule has no target");
        assert_eq!(
            LoweringError::malformed_query("Q :- Table1(a)", "head has no argument list")
                .to_string(),
            "malformed query `Q :- Table1(a)`: head has no argument list"
        );
    }

    #[test]
    fn backend_message() {
        assert_eq!(
            CompileError::UnknownBackend("prolog".into()).to_string(),
            "unknown backend `prolog` (expected `logic` or `rego`)"
        );
    }
}
