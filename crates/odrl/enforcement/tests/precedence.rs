//! Property tests: enforcement precedence and default deny.

use odrl_enforcement::{AccessRequest, Decision, Outcome, PolicyEnforcement};
use odrl_parser::parse_policies;
use odrl_types::{Policy, Rule};
use proptest::prelude::*;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn permission(action: &str, target: &str, assigner: &str) -> Rule {
    Rule::permission(action)
        .with_target(target)
        .with_assigner(assigner)
}

fn prohibition(action: &str, target: &str, assigner: &str) -> Rule {
    Rule::prohibition(action)
        .with_target(target)
        .with_assigner(assigner)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A matching unconstrained permission is Permitted; adding a prohibition
    /// for another action leaves it unchanged and prohibits that action.
    #[test]
    fn permission_then_prohibition(
        target in arb_name(),
        assigner in arb_name(),
        read in "r[a-z]{1,5}",
        write in "w[a-z]{1,5}",
    ) {
        let mut policy = Policy::new("p").with_rule(permission(&read, &target, &assigner));
        let before = PolicyEnforcement::new(vec![policy.clone()])
            .enforce_action(&read, &target, &assigner, None);
        prop_assert_eq!(before.outcome(), Outcome::Permitted);

        policy.add_rule(prohibition(&write, &target, &assigner));
        let engine = PolicyEnforcement::new(vec![policy]);
        prop_assert_eq!(engine.enforce_action(&read, &target, &assigner, None), before);
        prop_assert_eq!(
            engine.enforce_action(&write, &target, &assigner, None).outcome(),
            Outcome::Prohibited
        );
    }

    /// With no rule for the tuple the answer is always Undetermined.
    #[test]
    fn no_matching_rule_is_undetermined(
        action in arb_name(),
        target in arb_name(),
        assigner in arb_name(),
        other in "[A-Z]{1,6}",
    ) {
        let policy = Policy::new("p")
            .with_rule(permission(&action, &other, &assigner))
            .with_rule(prohibition(&action, &target, &other));
        let engine = PolicyEnforcement::new(vec![policy]);
        prop_assert_eq!(
            engine.enforce_action(&action, &target, &assigner, None),
            Decision::undetermined("No applicable permission found")
        );
    }

    /// enforce is Permitted only if check_permission holds, and Prohibited
    /// only if check_prohibition holds and check_permission does not.
    #[test]
    fn enforce_agrees_with_checks(
        rules in prop::collection::vec(
            (any::<bool>(), 0usize..3, 0usize..3, 0usize..3),
            0..8,
        ),
        query in (0usize..3, 0usize..3, 0usize..3),
    ) {
        let names = ["a", "b", "c"];
        let mut policy = Policy::new("p");
        for (allow, action, target, assigner) in rules {
            let (action, target, assigner) = (names[action], names[target], names[assigner]);
            policy.add_rule(if allow {
                permission(action, target, assigner)
            } else {
                prohibition(action, target, assigner)
            });
        }
        let engine = PolicyEnforcement::new(vec![policy]);
        let (action, target, assigner) = (names[query.0], names[query.1], names[query.2]);

        let permitted = engine.check_permission(action, target, assigner, None);
        let prohibited = engine.check_prohibition(action, target, assigner, None);
        let expected = if permitted {
            Outcome::Permitted
        } else if prohibited {
            Outcome::Prohibited
        } else {
            Outcome::Undetermined
        };
        prop_assert_eq!(engine.enforce_action(action, target, assigner, None).outcome(), expected);
    }
}

#[test]
fn decides_over_a_parsed_document() {
    let policies = parse_policies(
        r#"[
          {
            "uid": "http://example.com/policy:1",
            "@type": "Set",
            "permission": [{
              "target": "http://example.com/asset:123",
              "assigner": "http://example.com/user",
              "assignee": "http://example.com/admin",
              "action": [{ "value": "read" }],
              "constraint": [{ "leftOperand": "purpose", "operator": "isAnyOf", "rightOperand": ["research", "audit"] }]
            }]
          },
          {
            "uid": "http://example.com/policy:2",
            "@type": "Set",
            "prohibition": [{
              "target": "http://example.com/book/1999",
              "assigner": "http://example.com/user",
              "assignee": "http://example.com/admin",
              "action": "delete"
            }]
          }
        ]"#,
    )
    .unwrap();
    let engine = Arc::new(PolicyEnforcement::new(policies));

    let read = AccessRequest::new(
        "read",
        "http://example.com/asset:123",
        "http://example.com/user",
    )
    .with_assignee("http://example.com/admin")
    .with_attribute("purpose", "research");
    assert_eq!(
        engine.enforce(&read),
        Decision::permitted("http://example.com/policy:1", "read")
    );

    let marketing = read.clone().with_attribute("purpose", "marketing");
    assert_eq!(
        engine.enforce(&marketing),
        Decision::undetermined("constraint not satisfied: purpose")
    );

    let write = AccessRequest::new(
        "write",
        "http://example.com/asset:123",
        "http://example.com/user",
    );
    assert!(engine.enforce(&write).is_undetermined());

    assert!(engine
        .enforce_action(
            "delete",
            "http://example.com/book/1999",
            "http://example.com/user",
            Some("http://example.com/admin"),
        )
        .is_prohibited());
    assert!(engine
        .enforce_action(
            "update",
            "http://example.com/book/1999",
            "http://example.com/user",
            None,
        )
        .is_undetermined());
}

#[test]
fn engine_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PolicyEnforcement>();
}
