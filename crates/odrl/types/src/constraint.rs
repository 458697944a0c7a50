//! Constraint evaluation
//!
//! A constraint is either a leaf test (arithmetic, relational or set
//! membership against a right operand) or a logical combinator over an
//! ordered list of sub-constraints. Leaves never carry sub-constraints and
//! combinators never carry a right operand; the constructors enforce this.
//!
//! Evaluation never fails: a field-name mismatch, an unordered pair of
//! values or an unrecognised operator all evaluate to `false`.

use serde::Serialize;
use std::cmp::Ordering;

use crate::context::EvaluationContext;
use crate::error::ModelError;
use crate::operator::Operator;
use crate::value::Value;

/// Left operand reserved for embedded relational queries.
pub const QUERY_LEFT_OPERAND: &str = "ex:query";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<String>,
    operator: Operator,
    #[serde(skip_serializing_if = "Option::is_none")]
    left_operand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right_operand: Option<Value>,
    #[serde(rename = "constraint", skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<Constraint>,
}

impl Constraint {
    /// Create a leaf constraint comparing observed values to `right_operand`.
    pub fn new(operator: Operator, right_operand: impl Into<Value>) -> Result<Self, ModelError> {
        if operator.is_logical() {
            return Err(ModelError::OperatorArity {
                operator: operator.to_string(),
                expected: "leaf",
            });
        }
        Ok(Self {
            uid: None,
            operator,
            left_operand: None,
            right_operand: Some(right_operand.into()),
            constraints: Vec::new(),
        })
    }

    /// Create a logical constraint over `constraints`, kept in declaration order.
    pub fn compose(operator: Operator, constraints: Vec<Constraint>) -> Result<Self, ModelError> {
        if operator.is_leaf() {
            return Err(ModelError::OperatorArity {
                operator: operator.to_string(),
                expected: "logical",
            });
        }
        Ok(Self {
            uid: None,
            operator,
            left_operand: None,
            right_operand: None,
            constraints,
        })
    }

    /// Restrict the constraint to observations of a single attribute.
    pub fn with_left_operand(mut self, left_operand: impl Into<String>) -> Self {
        self.left_operand = Some(left_operand.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn left_operand(&self) -> Option<&str> {
        self.left_operand.as_deref()
    }

    pub fn right_operand(&self) -> Option<&Value> {
        self.right_operand.as_ref()
    }

    /// Sub-constraints of a logical constraint; empty for leaves.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_logical(&self) -> bool {
        self.operator.is_logical()
    }

    /// Whether this constraint carries an embedded relational query.
    pub fn is_query(&self) -> bool {
        self.left_operand.as_deref() == Some(QUERY_LEFT_OPERAND)
    }

    /// Embedded query text, when this is a query constraint.
    pub fn query(&self) -> Option<&str> {
        if self.is_query() {
            self.right_operand.as_ref().and_then(Value::as_str)
        } else {
            None
        }
    }

    /// Evaluate against one observed attribute.
    ///
    /// If a left operand is set and `field` differs from it, the result is
    /// `false` whatever the operator. Logical constraints hand the same
    /// `(field, value)` pair to each sub-constraint.
    pub fn evaluate(&self, field: &str, value: &Value) -> bool {
        if let Some(left) = &self.left_operand {
            if left != field {
                return false;
            }
        }

        if self.operator.is_logical() {
            let results: Vec<bool> = self
                .constraints
                .iter()
                .map(|constraint| constraint.evaluate(field, value))
                .collect();
            return combine(&self.operator, &results);
        }

        match &self.right_operand {
            Some(reference) => compare(&self.operator, value, reference),
            None => false,
        }
    }

    /// Evaluate against a context of named attributes.
    ///
    /// Leaves look their left operand up in the context; a leaf without a
    /// left operand, or whose attribute is absent, is not satisfied. Logical
    /// constraints without a left operand combine their sub-constraints'
    /// context evaluations.
    pub fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        match (&self.left_operand, self.operator.is_logical()) {
            (Some(left), _) => context
                .get(left)
                .map(|value| self.evaluate(left, value))
                .unwrap_or(false),
            (None, true) => {
                let results: Vec<bool> = self
                    .constraints
                    .iter()
                    .map(|constraint| constraint.is_satisfied_by(context))
                    .collect();
                combine(&self.operator, &results)
            }
            (None, false) => false,
        }
    }

    /// Depth of the constraint tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .constraints
            .iter()
            .map(Constraint::depth)
            .max()
            .unwrap_or(0)
    }

    /// All leaf constraints, left to right.
    pub fn leaves(&self) -> Vec<&Constraint> {
        if self.operator.is_logical() {
            self.constraints.iter().flat_map(Constraint::leaves).collect()
        } else {
            vec![self]
        }
    }
}

fn combine(operator: &Operator, results: &[bool]) -> bool {
    match operator {
        Operator::Or => results.iter().any(|r| *r),
        Operator::And => results.iter().all(|r| *r),
        Operator::Xone => results.iter().filter(|r| **r).count() == 1,
        // Non-increasing read in declaration order: no `false` before a `true`.
        Operator::AndSequence => {
            results.iter().all(|r| *r) && results.windows(2).all(|pair| pair[0] >= pair[1])
        }
        _ => false,
    }
}

fn compare(operator: &Operator, observed: &Value, reference: &Value) -> bool {
    let ordering = observed.compare(reference);
    match operator {
        Operator::Eq => observed == reference,
        Operator::Neq => observed != reference,
        Operator::Gt => ordering == Some(Ordering::Greater),
        Operator::Gteq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Operator::Lt => ordering == Some(Ordering::Less),
        Operator::Lteq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        Operator::IsA => reference
            .as_str()
            .map(|type_name| observed.kind().is_named(type_name))
            .unwrap_or(false),
        Operator::HasPart | Operator::IsAllOf => reference
            .elements()
            .iter()
            .all(|item| observed.contains(item)),
        Operator::IsPartOf => observed
            .elements()
            .iter()
            .all(|item| reference.contains(item)),
        Operator::IsAnyOf => observed
            .elements()
            .iter()
            .any(|item| reference.contains(item)),
        Operator::IsNoneOf => !observed
            .elements()
            .iter()
            .any(|item| reference.contains(item)),
        Operator::And
        | Operator::Or
        | Operator::Xone
        | Operator::AndSequence
        | Operator::Unrecognized(_) => false,
    }
}
