//! ODRL Parser - decoder for declarative policy documents.
//!
//! Turns a JSON policy document (one policy object, or an array of them)
//! into the [`odrl_types`] object graph. Identifiers, actions and operands
//! accept both the plain and the JSON-LD spellings (`"read"`,
//! `{"@id": "odrl:read"}`, `{"@value": 5}`).
//!
//! Decoding is structural only: an unknown operator is kept as
//! [`odrl_types::Operator::Unrecognized`] and fails closed later, whereas a
//! missing `uid`, a rule without an action or a constraint without an
//! operator is a [`ParseError`] naming the offending path.

#![deny(unsafe_code)]

mod decoder;
pub mod error;

use odrl_types::Policy;
use serde_json::Value as Json;

use crate::decoder::Decoder;
pub use crate::error::ParseError;

/// Default bound on nested rules and logical constraints.
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of duty/remedy/consequence rules and logical
    /// constraints.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Policy document decoder
#[derive(Debug, Clone, Default)]
pub struct PolicyParser {
    options: ParserOptions,
}

impl PolicyParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Decode a JSON document holding one policy or an array of policies.
    pub fn parse_str(&self, input: &str) -> Result<Vec<Policy>, ParseError> {
        let document: Json = serde_json::from_str(input)?;
        self.parse_value(&document)
    }

    pub fn parse_value(&self, document: &Json) -> Result<Vec<Policy>, ParseError> {
        Decoder::new(&self.options).decode_document(document)
    }

    /// Decode exactly one policy object.
    pub fn parse_policy(&self, policy: &Json) -> Result<Policy, ParseError> {
        Decoder::new(&self.options).decode_policy(policy)
    }
}

/// Decode a policy document with default options.
pub fn parse_policies(input: &str) -> Result<Vec<Policy>, ParseError> {
    PolicyParser::default().parse_str(input)
}

/// Decode one policy object with default options.
pub fn parse_policy_value(policy: &Json) -> Result<Policy, ParseError> {
    PolicyParser::default().parse_policy(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odrl_types::{Operator, RuleKind, Value};
    use serde_json::json;

    #[test]
    fn parses_single_policy_object() {
        let policies = parse_policies(
            r#"{
                "uid": "urn:policy:1",
                "@type": "Set",
                "profile": "urn:profile:dpv",
                "permission": {
                    "action": "read",
                    "target": "urn:dataset:a",
                    "assigner": "urn:party:owner"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(policies.len(), 1);
        let policy = &policies[0];
        assert_eq!(policy.policy_type.as_deref(), Some("Set"));
        assert_eq!(policy.profiles, vec!["urn:profile:dpv"]);
        assert_eq!(policy.permission.len(), 1);
        assert!(policy.permission[0].action.matches("read"));
    }

    #[test]
    fn nested_rules_take_the_kind_of_their_key() {
        let policy = parse_policy_value(&json!({
            "uid": "p",
            "permission": [{
                "action": "use",
                "duty": [{
                    "action": "pay",
                    "consequence": { "action": "compensate" }
                }]
            }],
            "prohibition": [{
                "action": "share",
                "remedy": { "action": "delete" }
            }],
            "obligation": [{
                "action": "delete",
                "actions": ["notify", { "value": "log" }]
            }]
        }))
        .unwrap();

        let duty = &policy.permission[0].duty_list()[0];
        assert_eq!(duty.kind(), RuleKind::Duty);
        assert_eq!(duty.consequence()[0].label(), "compensate");
        assert_eq!(policy.prohibition[0].remedy()[0].label(), "delete");
        assert_eq!(policy.obligation[0].actions().len(), 2);
    }

    #[test]
    fn parses_leaf_and_logical_constraints() {
        let policy = parse_policy_value(&json!({
            "uid": "p",
            "permission": [{
                "action": "read",
                "constraint": [
                    { "leftOperand": "odrl:count", "operator": "odrl:lteq", "rightOperand": { "@value": 10 } },
                    { "or": [
                        { "leftOperand": "purpose", "operator": "eq", "rightOperand": "research" },
                        { "leftOperand": "purpose", "operator": "eq", "rightOperand": "teaching" }
                    ]},
                    { "operator": "xone", "constraint": [
                        { "leftOperand": "region", "operator": "isAnyOf", "rightOperand": ["eu", "uk"] }
                    ]}
                ]
            }]
        }))
        .unwrap();

        let constraints = &policy.permission[0].constraint;
        assert_eq!(constraints[0].operator(), &Operator::Lteq);
        assert_eq!(constraints[0].right_operand(), Some(&Value::from(10)));
        assert_eq!(constraints[1].operator(), &Operator::Or);
        assert_eq!(constraints[1].constraints().len(), 2);
        assert_eq!(constraints[2].operator(), &Operator::Xone);
        assert_eq!(
            constraints[2].constraints()[0].right_operand(),
            Some(&Value::from(vec!["eu", "uk"]))
        );
    }

    #[test]
    fn composite_entities_keep_refinements() {
        let policy = parse_policy_value(&json!({
            "uid": "p",
            "permission": [{
                "action": [{
                    "rdf:value": { "@id": "odrl:print" },
                    "refinement": { "leftOperand": "resolution", "operator": "lteq", "rightOperand": 1200 },
                    "implies": "display"
                }],
                "target": {
                    "uid": "urn:collection:photos",
                    "refinement": [{ "leftOperand": "dateTime", "operator": "gt", "rightOperand": "2020-01-01" }]
                },
                "assignee": { "source": "urn:party:members", "refinement": [] }
            }]
        }))
        .unwrap();

        let rule = &policy.permission[0];
        assert_eq!(rule.action.primary_source(), Some("odrl:print"));
        assert_eq!(rule.action.refinement().len(), 1);
        assert!(rule
            .action
            .primary()
            .map(|a| a.implies_action("display"))
            .unwrap_or(false));

        let target = rule.target.as_ref().unwrap();
        assert_eq!(target.source(), "urn:collection:photos");
        assert_eq!(target.refinement().len(), 1);
        assert_eq!(rule.assignee.as_ref().unwrap().source(), "urn:party:members");
    }

    #[test]
    fn unknown_operators_are_kept() {
        let policy = parse_policy_value(&json!({
            "uid": "p",
            "permission": [{
                "action": "read",
                "constraint": { "leftOperand": "x", "operator": "ex:near", "rightOperand": 1 }
            }]
        }))
        .unwrap();
        assert!(policy.permission[0].constraint[0].operator().is_unrecognized());
    }

    #[test]
    fn structural_errors_carry_paths() {
        let err = parse_policies(r#"[{"uid": "p", "permission": [{"target": "t"}]}]"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "action", .. }));
        assert_eq!(err.path(), Some("/0/permission/0"));

        let err = parse_policies(r#"[{"permission": []}]"#).unwrap_err();
        assert_eq!(err.path(), Some("/0"));

        let err = parse_policies(
            r#"{"uid": "p", "permission": [{"action": "read", "target": 5}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("/permission/0/target"));

        let err = parse_policies(
            r#"{"uid": "p", "permission": [{"action": "read", "constraint": {"operator": "and"}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidConstraint { .. }));

        assert!(matches!(parse_policies("not json"), Err(ParseError::Json(_))));
        assert!(matches!(
            parse_policies("42"),
            Err(ParseError::InvalidType { .. })
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        let document = json!({
            "uid": "p",
            "permission": [{
                "action": "use",
                "duty": [{ "action": "pay", "consequence": [{ "action": "fine" }] }]
            }]
        });

        let shallow = PolicyParser::new(ParserOptions::default().with_max_depth(2));
        let err = shallow.parse_value(&document).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep { max_depth: 2, .. }));
        assert_eq!(err.path(), Some("/permission/0/duty/0/consequence/0"));

        let deep = PolicyParser::new(ParserOptions::default().with_max_depth(3));
        assert!(deep.parse_value(&document).is_ok());
    }
}
