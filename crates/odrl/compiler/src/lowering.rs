//! Backend-neutral lowering
//!
//! A rule becomes a flat conjunction of [`Atom`]s over existential
//! variables `x0, x1, ...`. Renderers only choose symbols and assembly
//! syntax; variable numbering and taxonomy resolution happen here.

use odrl_types::{local_name, term_name, Constraint, Operator, Rule, RuleKind, Value};
use serde::Serialize;

use crate::error::LoweringError;
use crate::query::parse_query;
use crate::taxonomy::Taxonomies;

/// Right-hand side of a comparison or class test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Single(String),
    Set(Vec<String>),
}

impl Operand {
    pub fn items(&self) -> Vec<&str> {
        match self {
            Operand::Single(item) => vec![item.as_str()],
            Operand::Set(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "atom", rename_all = "camelCase")]
pub enum Atom {
    /// `Permission(Pe1)`
    Head { kind: RuleKind, id: String },
    /// `hasTarget(Pe1, x0)`
    Relation {
        role: String,
        subject: String,
        object: String,
    },
    /// `Dataset(x0)`
    Class { var: String, labels: Operand },
    /// `x3 ≥ 18`
    Compare {
        var: String,
        operator: Operator,
        operand: Operand,
    },
    /// Query body term, kept as written
    Verbatim { term: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoweredRule {
    pub kind: RuleKind,
    pub display_id: String,
    /// Name the rule's relations hang off: the display id, or a query head
    pub subject: String,
    pub atoms: Vec<Atom>,
}

/// Lowering state for one compile call.
#[derive(Debug)]
pub(crate) struct Lowering<'t> {
    taxonomies: &'t Taxonomies,
    next_var: usize,
}

impl<'t> Lowering<'t> {
    pub(crate) fn new(taxonomies: &'t Taxonomies) -> Self {
        Self {
            taxonomies,
            next_var: 0,
        }
    }

    pub(crate) fn next_var(&self) -> usize {
        self.next_var
    }

    pub(crate) fn rewind(&mut self, to: usize) {
        self.next_var = to;
    }

    fn fresh(&mut self) -> String {
        let var = format!("x{}", self.next_var);
        self.next_var += 1;
        var
    }

    pub(crate) fn lower(
        &mut self,
        rule: &Rule,
        display_id: String,
    ) -> Result<LoweredRule, LoweringError> {
        let mut atoms = vec![Atom::Head {
            kind: rule.kind(),
            id: display_id.clone(),
        }];
        let mut subject = display_id.clone();

        let query_text = match rule.constraint.iter().find_map(Constraint::query) {
            Some(query) => query,
            None => rule
                .target
                .as_ref()
                .ok_or(LoweringError::MissingTarget)?
                .source(),
        };

        if query_text.contains(":-") {
            let query = parse_query(query_text)?;
            atoms.push(Atom::Relation {
                role: "target".to_string(),
                subject: query.head.clone(),
                object: query.inputs,
            });
            atoms.extend(query.tables.into_iter().map(|term| Atom::Verbatim { term }));
            subject = query.head;
        } else {
            let var = self.fresh();
            atoms.push(Atom::Relation {
                role: "target".to_string(),
                subject: subject.clone(),
                object: var.clone(),
            });
            atoms.push(Atom::Class {
                var: var.clone(),
                labels: Operand::Single(local_name(query_text).to_string()),
            });
            let refinements = rule.target.as_ref().map(|target| target.refinement());
            for refinement in refinements.unwrap_or_default() {
                self.constraint(&var, refinement, &mut atoms)?;
            }
        }

        if let Some(assignee) = &rule.assignee {
            if let Some(label) = self.taxonomies.actors.resolve(assignee.source()) {
                let var = self.entity(&subject, "actor", label, &mut atoms);
                for refinement in assignee.refinement() {
                    self.constraint(&var, refinement, &mut atoms)?;
                }
            }
        }

        if let Some(action) = rule.action.primary_source() {
            if let Some(label) = self.taxonomies.actions.resolve(action) {
                let var = self.entity(&subject, "action", label, &mut atoms);
                for refinement in rule.action.refinement() {
                    self.constraint(&var, refinement, &mut atoms)?;
                }
            }
        }

        for constraint in rule.constraint.iter().filter(|c| !c.is_query()) {
            self.constraint(&subject, constraint, &mut atoms)?;
        }

        Ok(LoweredRule {
            kind: rule.kind(),
            display_id,
            subject,
            atoms,
        })
    }

    /// `has<Role>(subject, x) ∧ Label(x)`, returning `x`.
    fn entity(&mut self, subject: &str, role: &str, label: String, atoms: &mut Vec<Atom>) -> String {
        let var = self.fresh();
        atoms.push(Atom::Relation {
            role: role.to_string(),
            subject: subject.to_string(),
            object: var.clone(),
        });
        atoms.push(Atom::Class {
            var: var.clone(),
            labels: Operand::Single(label),
        });
        var
    }

    /// Lower a constraint hanging off `parent`. A logical constraint is
    /// flattened into its leaves, which all share one variable.
    fn constraint(
        &mut self,
        parent: &str,
        constraint: &Constraint,
        atoms: &mut Vec<Atom>,
    ) -> Result<(), LoweringError> {
        let var = self.fresh();
        self.leaf(parent, &var, constraint, atoms)
    }

    fn leaf(
        &self,
        parent: &str,
        var: &str,
        constraint: &Constraint,
        atoms: &mut Vec<Atom>,
    ) -> Result<(), LoweringError> {
        if constraint.is_logical() {
            for nested in constraint.constraints() {
                self.leaf(parent, var, nested, atoms)?;
            }
            return Ok(());
        }

        let left = constraint
            .left_operand()
            .ok_or_else(|| LoweringError::MissingLeftOperand {
                operator: constraint.operator().to_string(),
            })?;
        let role = term_name(left).to_string();
        let right = constraint
            .right_operand()
            .filter(|value| !(value.is_collection() && value.elements().is_empty()))
            .ok_or_else(|| LoweringError::EmptyRightOperand {
                left_operand: left.to_string(),
            })?;

        let var = var.to_string();
        atoms.push(Atom::Relation {
            role: role.clone(),
            subject: parent.to_string(),
            object: var.clone(),
        });

        if role == "purpose" || *constraint.operator() == Operator::IsA {
            let purpose = role == "purpose";
            let taxonomies = self.taxonomies;
            let labels = operand(right, |raw| {
                if purpose {
                    taxonomies
                        .purposes
                        .resolve(raw)
                        .unwrap_or_else(|| local_name(raw).to_string())
                } else {
                    local_name(raw).to_string()
                }
            });
            atoms.push(Atom::Class { var, labels });
        } else {
            atoms.push(Atom::Compare {
                var,
                operator: constraint.operator().clone(),
                operand: operand(right, |raw| local_name(raw).to_string()),
            });
        }
        Ok(())
    }
}

/// Render a right operand, abbreviating strings with `name`.
fn operand(value: &Value, mut name: impl FnMut(&str) -> String) -> Operand {
    let mut scalar = |value: &Value| match value {
        Value::String(raw) => name(raw),
        other => other.to_string(),
    };
    match value {
        Value::List(items) => Operand::Set(items.iter().map(&mut scalar).collect()),
        other => Operand::Single(scalar(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odrl_types::{Action, AssetCollection, PartyCollection};
    use crate::taxonomy::TaxonomyTable;

    fn taxonomies() -> Taxonomies {
        Taxonomies::empty()
            .with_actions(TaxonomyTable::default().with_entry("http://www.w3.org/ns/odrl/2/read", "read"))
            .with_actors(TaxonomyTable::default().with_entry("https://w3id.org/dpv#Citizen", "Citizen"))
            .with_purposes(
                TaxonomyTable::default()
                    .with_entry("https://w3id.org/dpv#AcademicResearch", "Academic Research"),
            )
    }

    fn leaf(left: &str, operator: Operator, right: impl Into<Value>) -> Constraint {
        Constraint::new(operator, right).unwrap().with_left_operand(left)
    }

    #[test]
    fn plain_target_with_refinement() {
        let taxonomies = taxonomies();
        let mut lowering = Lowering::new(&taxonomies);
        let rule = Rule::permission("http://www.w3.org/ns/odrl/2/read").with_target(
            AssetCollection::new("http://example.com/data#Dataset")
                .with_refinement(leaf("ex:year", Operator::Gteq, 2020)),
        );

        let lowered = lowering.lower(&rule, "Pe1".into()).unwrap();
        assert_eq!(lowered.subject, "Pe1");
        assert_eq!(
            lowered.atoms[1..4],
            [
                Atom::Relation { role: "target".into(), subject: "Pe1".into(), object: "x0".into() },
                Atom::Class { var: "x0".into(), labels: Operand::Single("Dataset".into()) },
                Atom::Relation { role: "year".into(), subject: "x0".into(), object: "x1".into() },
            ]
        );
        assert_eq!(
            lowered.atoms[4],
            Atom::Compare {
                var: "x1".into(),
                operator: Operator::Gteq,
                operand: Operand::Single("2020".into()),
            }
        );
        // action resolved through the taxonomy
        assert_eq!(
            lowered.atoms[5],
            Atom::Relation { role: "action".into(), subject: "Pe1".into(), object: "x2".into() }
        );
        assert_eq!(lowering.next_var(), 3);
    }

    #[test]
    fn query_constraint_replaces_the_target() {
        let taxonomies = Taxonomies::empty();
        let mut lowering = Lowering::new(&taxonomies);
        let rule = Rule::prohibition("read")
            .with_target("urn:ignored")
            .with_constraint(leaf("ex:query", Operator::Eq, "Q(a) :- Table1(a, b), Table2(b)"));

        let lowered = lowering.lower(&rule, "Pr1".into()).unwrap();
        assert_eq!(lowered.subject, "Q");
        assert_eq!(
            lowered.atoms[1..],
            [
                Atom::Relation { role: "target".into(), subject: "Q".into(), object: "a".into() },
                Atom::Verbatim { term: "Table1(a, b)".into() },
                Atom::Verbatim { term: "Table2(b)".into() },
            ]
        );
        assert_eq!(lowering.next_var(), 0);
    }

    #[test]
    fn actor_purpose_and_sets() {
        let taxonomies = taxonomies();
        let mut lowering = Lowering::new(&taxonomies);
        let rule = Rule::permission(Action::new("share"))
            .with_target("urn:asset")
            .with_assignee(
                PartyCollection::new("https://w3id.org/dpv#Citizen")
                    .with_refinement(leaf("age", Operator::Gt, 17)),
            )
            .with_constraint(leaf("purpose", Operator::Eq, "https://w3id.org/dpv#AcademicResearch"))
            .with_constraint(leaf("odrl:spatial", Operator::IsAnyOf, vec!["http://ex/DE", "http://ex/FR"]));

        let atoms = lowering.lower(&rule, "Pe1".into()).unwrap().atoms;
        assert!(atoms.contains(&Atom::Class { var: "x1".into(), labels: Operand::Single("Citizen".into()) }));
        assert!(atoms.contains(&Atom::Relation { role: "age".into(), subject: "x1".into(), object: "x2".into() }));
        assert!(atoms.contains(&Atom::Class {
            var: "x3".into(),
            labels: Operand::Single("AcademicResearch".into()),
        }));
        assert!(atoms.contains(&Atom::Compare {
            var: "x4".into(),
            operator: Operator::IsAnyOf,
            operand: Operand::Set(vec!["DE".into(), "FR".into()]),
        }));
    }

    #[test]
    fn logical_constraints_flatten() {
        let taxonomies = Taxonomies::empty();
        let mut lowering = Lowering::new(&taxonomies);
        let both = Constraint::compose(
            Operator::And,
            vec![leaf("a", Operator::Eq, 1), leaf("b", Operator::Lt, 2)],
        )
        .unwrap();
        let rule = Rule::obligation("pay")
            .with_target("urn:t")
            .with_constraint(both)
            .with_constraint(leaf("c", Operator::Gt, 3));

        let atoms = lowering.lower(&rule, "Ob1".into()).unwrap().atoms;
        let relations: Vec<_> = atoms
            .iter()
            .filter_map(|atom| match atom {
                Atom::Relation { role, object, .. } => Some((role.as_str(), object.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            relations,
            vec![("target", "x0"), ("a", "x1"), ("b", "x1"), ("c", "x2")]
        );
        assert_eq!(lowering.next_var(), 3);
    }

    #[test]
    fn query_constraint_without_a_target() {
        let taxonomies = Taxonomies::empty();
        let mut lowering = Lowering::new(&taxonomies);
        let rule = Rule::prohibition("read")
            .with_constraint(leaf("ex:query", Operator::Eq, "Q(a, b) :- Table1(a, c), Table2(c, b)"));

        let lowered = lowering.lower(&rule, "Pr1".into()).unwrap();
        assert_eq!(lowered.subject, "Q");
        assert_eq!(
            lowered.atoms[1],
            Atom::Relation { role: "target".into(), subject: "Q".into(), object: "a, b".into() }
        );
    }

    #[test]
    fn class_test_on_other_operands() {
        let taxonomies = Taxonomies::empty();
        let mut lowering = Lowering::new(&taxonomies);
        let rule = Rule::permission("read")
            .with_target("urn:t")
            .with_constraint(leaf("ex:recipient", Operator::IsA, "http://example.com/org#Hospital"));

        let atoms = lowering.lower(&rule, "Pe1".into()).unwrap().atoms;
        assert_eq!(
            atoms[3..],
            [
                Atom::Relation { role: "recipient".into(), subject: "Pe1".into(), object: "x1".into() },
                Atom::Class { var: "x1".into(), labels: Operand::Single("Hospital".into()) },
            ]
        );
    }

    #[test]
    fn action_refinements_hang_off_the_action() {
        let taxonomies = taxonomies();
        let mut lowering = Lowering::new(&taxonomies);
        let rule = Rule::permission(
            Action::new("http://www.w3.org/ns/odrl/2/read")
                .with_refinement(leaf("count", Operator::Lteq, 5))
                .with_refinement(leaf("purpose", Operator::Eq, "https://w3id.org/dpv#AcademicResearch")),
        )
        .with_target("urn:t");

        let atoms = lowering.lower(&rule, "Pe1".into()).unwrap().atoms;
        assert_eq!(
            atoms[3..],
            [
                Atom::Relation { role: "action".into(), subject: "Pe1".into(), object: "x1".into() },
                Atom::Class { var: "x1".into(), labels: Operand::Single("read".into()) },
                Atom::Relation { role: "count".into(), subject: "x1".into(), object: "x2".into() },
                Atom::Compare {
                    var: "x2".into(),
                    operator: Operator::Lteq,
                    operand: Operand::Single("5".into()),
                },
                Atom::Relation { role: "purpose".into(), subject: "x1".into(), object: "x3".into() },
                Atom::Class { var: "x3".into(), labels: Operand::Single("AcademicResearch".into()) },
            ]
        );
    }

    #[test]
    fn lowering_errors() {
        let taxonomies = Taxonomies::empty();
        let mut lowering = Lowering::new(&taxonomies);

        let untargeted = Rule::permission("read");
        assert_eq!(
            lowering.lower(&untargeted, "Pe1".into()),
            Err(LoweringError::MissingTarget)
        );

        let anonymous = Rule::permission("read")
            .with_target("urn:t")
            .with_constraint(Constraint::new(Operator::Eq, 1).unwrap());
        assert_eq!(
            lowering.lower(&anonymous, "Pe2".into()),
            Err(LoweringError::MissingLeftOperand { operator: "eq".into() })
        );

        let empty = Rule::permission("read")
            .with_target("urn:t")
            .with_constraint(leaf("region", Operator::IsAnyOf, Vec::<String>::new()));
        assert_eq!(
            lowering.lower(&empty, "Pe3".into()),
            Err(LoweringError::EmptyRightOperand { left_operand: "region".into() })
        );

        let headless = Rule::permission("read").with_target("Q :- Table1(a)");
        assert!(matches!(
            lowering.lower(&headless, "Pe4".into()),
            Err(LoweringError::MalformedQuery { .. })
        ));
    }
}
