//! Constraint operators
//!
//! Operators arrive as bare tokens (`eq`), compact IRIs (`odrl:eq`) or full
//! IRIs (`http://www.w3.org/ns/odrl/2/eq`). Tokens that name no known
//! operator are kept as [`Operator::Unrecognized`] so they fail closed at
//! evaluation time instead of failing the whole document.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::iri::term_name;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Gt,
    Gteq,
    Lt,
    Lteq,
    Neq,
    IsA,
    HasPart,
    IsPartOf,
    IsAllOf,
    IsAnyOf,
    IsNoneOf,
    And,
    Or,
    Xone,
    AndSequence,
    Unrecognized(String),
}

impl Operator {
    /// Parse an operator token, IRI or compact IRI. Never fails.
    pub fn parse(raw: &str) -> Self {
        match term_name(raw.trim()) {
            "eq" => Operator::Eq,
            "gt" => Operator::Gt,
            "gteq" => Operator::Gteq,
            "lt" => Operator::Lt,
            "lteq" => Operator::Lteq,
            "neq" => Operator::Neq,
            "isA" => Operator::IsA,
            "hasPart" => Operator::HasPart,
            "isPartOf" => Operator::IsPartOf,
            "isAllOf" => Operator::IsAllOf,
            "isAnyOf" => Operator::IsAnyOf,
            "isNoneOf" => Operator::IsNoneOf,
            "and" => Operator::And,
            "or" => Operator::Or,
            "xone" => Operator::Xone,
            "andSequence" => Operator::AndSequence,
            _ => Operator::Unrecognized(raw.to_string()),
        }
    }

    /// Canonical ODRL token for this operator.
    pub fn token(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Gteq => "gteq",
            Operator::Lt => "lt",
            Operator::Lteq => "lteq",
            Operator::Neq => "neq",
            Operator::IsA => "isA",
            Operator::HasPart => "hasPart",
            Operator::IsPartOf => "isPartOf",
            Operator::IsAllOf => "isAllOf",
            Operator::IsAnyOf => "isAnyOf",
            Operator::IsNoneOf => "isNoneOf",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Xone => "xone",
            Operator::AndSequence => "andSequence",
            Operator::Unrecognized(raw) => raw,
        }
    }

    /// Combinators over sub-constraints.
    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            Operator::And | Operator::Or | Operator::Xone | Operator::AndSequence
        )
    }

    /// Arithmetic, relational and set tests.
    pub fn is_leaf(&self) -> bool {
        !self.is_logical() && !self.is_unrecognized()
    }

    /// Set-membership operators that treat operands as collections.
    pub fn is_set_operator(&self) -> bool {
        matches!(
            self,
            Operator::HasPart
                | Operator::IsPartOf
                | Operator::IsAllOf
                | Operator::IsAnyOf
                | Operator::IsNoneOf
        )
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Operator::Unrecognized(_))
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        Operator::parse(&raw)
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        Operator::parse(raw)
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.token().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
