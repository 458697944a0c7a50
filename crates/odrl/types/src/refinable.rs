//! Refinable entities
//!
//! Actions, asset collections and party collections each carry an
//! identifier plus their own list of refinement constraints. Rules refer to
//! them either by a literal identifier or by a composite entity; the
//! [`Identifier`] union makes that choice explicit.

use serde::Serialize;

use crate::constraint::Constraint;

/// Uniform add/remove contract over an entity's refinement list.
pub trait Refinable {
    /// Identifier of the entity (action name, asset or party IRI).
    fn source(&self) -> &str;

    fn refinement(&self) -> &[Constraint];

    fn refinement_mut(&mut self) -> &mut Vec<Constraint>;

    fn add_refinement(&mut self, constraint: Constraint) {
        self.refinement_mut().push(constraint);
    }

    /// Remove the first refinement equal to `constraint`. Absent is not an
    /// error; the return value says whether anything was removed.
    fn remove_refinement(&mut self, constraint: &Constraint) -> bool {
        let refinements = self.refinement_mut();
        match refinements.iter().position(|c| c == constraint) {
            Some(index) => {
                refinements.remove(index);
                true
            }
            None => false,
        }
    }

    fn is_refined(&self) -> bool {
        !self.refinement().is_empty()
    }
}

/// An action, possibly narrowed by refinements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refinement: Vec<Constraint>,
    /// Actions implied by performing this one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implies: Vec<String>,
    /// The broader action this one is included in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_in: Option<String>,
}

impl Action {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            refinement: Vec::new(),
            implies: Vec::new(),
            included_in: None,
        }
    }

    pub fn with_refinement(mut self, constraint: Constraint) -> Self {
        self.refinement.push(constraint);
        self
    }

    pub fn with_included_in(mut self, action: impl Into<String>) -> Self {
        self.included_in = Some(action.into());
        self
    }

    pub fn add_implied_action(&mut self, action: impl Into<String>) {
        self.implies.push(action.into());
    }

    pub fn implies_action(&self, action: &str) -> bool {
        self.implies.iter().any(|implied| implied == action)
    }
}

impl Refinable for Action {
    fn source(&self) -> &str {
        &self.value
    }

    fn refinement(&self) -> &[Constraint] {
        &self.refinement
    }

    fn refinement_mut(&mut self) -> &mut Vec<Constraint> {
        &mut self.refinement
    }
}

/// A set of assets a rule targets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetCollection {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refinement: Vec<Constraint>,
}

impl AssetCollection {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            uid: None,
            refinement: Vec::new(),
        }
    }

    pub fn with_refinement(mut self, constraint: Constraint) -> Self {
        self.refinement.push(constraint);
        self
    }
}

impl Refinable for AssetCollection {
    fn source(&self) -> &str {
        &self.source
    }

    fn refinement(&self) -> &[Constraint] {
        &self.refinement
    }

    fn refinement_mut(&mut self) -> &mut Vec<Constraint> {
        &mut self.refinement
    }
}

/// A pool of parties acting as assigner or assignee
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyCollection {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refinement: Vec<Constraint>,
}

impl PartyCollection {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            uid: None,
            refinement: Vec::new(),
        }
    }

    pub fn with_refinement(mut self, constraint: Constraint) -> Self {
        self.refinement.push(constraint);
        self
    }
}

impl Refinable for PartyCollection {
    fn source(&self) -> &str {
        &self.source
    }

    fn refinement(&self) -> &[Constraint] {
        &self.refinement
    }

    fn refinement_mut(&mut self) -> &mut Vec<Constraint> {
        &mut self.refinement
    }
}

/// Literal identifier or composite entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Identifier<T> {
    Literal(String),
    Composite(T),
}

impl<T: Refinable> Identifier<T> {
    pub fn literal(value: impl Into<String>) -> Self {
        Identifier::Literal(value.into())
    }

    pub fn composite(entity: T) -> Self {
        Identifier::Composite(entity)
    }

    /// Literal text, or the composite entity's `source`.
    pub fn source(&self) -> &str {
        match self {
            Identifier::Literal(value) => value,
            Identifier::Composite(entity) => entity.source(),
        }
    }

    /// Refinements of a composite entity; always empty for literals.
    pub fn refinement(&self) -> &[Constraint] {
        match self {
            Identifier::Literal(_) => &[],
            Identifier::Composite(entity) => entity.refinement(),
        }
    }

    pub fn as_composite(&self) -> Option<&T> {
        match self {
            Identifier::Composite(entity) => Some(entity),
            Identifier::Literal(_) => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Identifier::Composite(_))
    }

    /// Exact match on the identifier text.
    pub fn matches(&self, identifier: &str) -> bool {
        self.source() == identifier
    }
}

impl<T> From<&str> for Identifier<T> {
    fn from(value: &str) -> Self {
        Identifier::Literal(value.to_string())
    }
}

impl<T> From<String> for Identifier<T> {
    fn from(value: String) -> Self {
        Identifier::Literal(value)
    }
}

impl From<AssetCollection> for Identifier<AssetCollection> {
    fn from(entity: AssetCollection) -> Self {
        Identifier::Composite(entity)
    }
}

impl From<PartyCollection> for Identifier<PartyCollection> {
    fn from(entity: PartyCollection) -> Self {
        Identifier::Composite(entity)
    }
}

/// The action of a rule: a bare name or one or more action entities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionRef {
    Name(String),
    Actions(Vec<Action>),
}

impl ActionRef {
    /// Whether a requested action name selects this rule.
    ///
    /// A bare name must be equal; a list of entities matches when any of
    /// them carries the requested name.
    pub fn matches(&self, action: &str) -> bool {
        match self {
            ActionRef::Name(name) => name == action,
            ActionRef::Actions(actions) => actions.iter().any(|a| a.value == action),
        }
    }

    /// The first action entity, if this is a list of entities.
    pub fn primary(&self) -> Option<&Action> {
        match self {
            ActionRef::Name(_) => None,
            ActionRef::Actions(actions) => actions.first(),
        }
    }

    /// Name of the bare action, or of the first action entity.
    pub fn primary_source(&self) -> Option<&str> {
        match self {
            ActionRef::Name(name) => Some(name),
            ActionRef::Actions(actions) => actions.first().map(|a| a.value.as_str()),
        }
    }

    /// Refinements of the first action entity.
    pub fn refinement(&self) -> &[Constraint] {
        self.primary().map(|a| a.refinement()).unwrap_or(&[])
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            ActionRef::Name(name) => vec![name.as_str()],
            ActionRef::Actions(actions) => actions.iter().map(|a| a.value.as_str()).collect(),
        }
    }
}

impl From<&str> for ActionRef {
    fn from(name: &str) -> Self {
        ActionRef::Name(name.to_string())
    }
}

impl From<String> for ActionRef {
    fn from(name: String) -> Self {
        ActionRef::Name(name)
    }
}

impl From<Action> for ActionRef {
    fn from(action: Action) -> Self {
        ActionRef::Actions(vec![action])
    }
}

impl From<Vec<Action>> for ActionRef {
    fn from(actions: Vec<Action>) -> Self {
        ActionRef::Actions(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;

    fn refinement(value: i64) -> Constraint {
        Constraint::new(Operator::Lteq, value)
            .unwrap()
            .with_left_operand("count")
    }

    #[test]
    fn add_and_remove_refinements() {
        let mut asset = AssetCollection::new("urn:dataset:1");
        asset.add_refinement(refinement(5));
        asset.add_refinement(refinement(10));
        assert!(asset.is_refined());

        assert!(asset.remove_refinement(&refinement(5)));
        assert_eq!(asset.refinement(), &[refinement(10)]);
    }

    #[test]
    fn removing_an_absent_refinement_is_a_no_op() {
        let mut party = PartyCollection::new("urn:party:staff");
        party.add_refinement(refinement(1));
        assert!(!party.remove_refinement(&refinement(2)));
        assert_eq!(party.refinement().len(), 1);
    }

    #[test]
    fn identifier_exposes_source_for_both_forms() {
        let literal: Identifier<AssetCollection> = "urn:a".into();
        let composite: Identifier<AssetCollection> =
            AssetCollection::new("urn:b").with_refinement(refinement(3)).into();

        assert_eq!(literal.source(), "urn:a");
        assert!(literal.refinement().is_empty());
        assert_eq!(composite.source(), "urn:b");
        assert_eq!(composite.refinement().len(), 1);
        assert!(composite.is_composite());
        assert!(composite.matches("urn:b"));
    }

    #[test]
    fn action_ref_matching() {
        let bare = ActionRef::from("read");
        assert!(bare.matches("read"));
        assert!(!bare.matches("write"));

        let entities = ActionRef::from(vec![Action::new("print"), Action::new("display")]);
        assert!(entities.matches("display"));
        assert!(!entities.matches("read"));
        assert_eq!(entities.primary_source(), Some("print"));
        assert_eq!(entities.names(), vec!["print", "display"]);
    }

    #[test]
    fn implied_actions() {
        let mut share = Action::new("share").with_included_in("use");
        share.add_implied_action("distribute");
        assert!(share.implies_action("distribute"));
        assert!(!share.implies_action("delete"));
        assert_eq!(share.included_in.as_deref(), Some("use"));
    }
}
