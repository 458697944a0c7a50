use thiserror::Error;

/// Structural failures while decoding a policy document.
///
/// Every variant except [`ParseError::Json`] carries the path of the
/// offending node (`/0/permission/1/target`).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field `{field}` at {path}")]
    MissingField { path: String, field: &'static str },

    #[error("expected {expected} at {path}")]
    InvalidType { path: String, expected: &'static str },

    #[error("invalid constraint at {path}: {reason}")]
    InvalidConstraint { path: String, reason: String },

    #[error("nesting deeper than {max_depth} levels at {path}")]
    TooDeep { path: String, max_depth: usize },
}

impl ParseError {
    pub fn missing(path: impl Into<String>, field: &'static str) -> Self {
        ParseError::MissingField {
            path: path.into(),
            field,
        }
    }

    pub fn invalid_type(path: impl Into<String>, expected: &'static str) -> Self {
        ParseError::InvalidType {
            path: path.into(),
            expected,
        }
    }

    pub fn invalid_constraint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::InvalidConstraint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Document path of the failure, if it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ParseError::Json(_) => None,
            ParseError::MissingField { path, .. }
            | ParseError::InvalidType { path, .. }
            | ParseError::InvalidConstraint { path, .. }
            | ParseError::TooDeep { path, .. } => Some(path),
        }
    }
}
