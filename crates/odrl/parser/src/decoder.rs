//! JSON tree walker that builds the policy object graph.

use odrl_types::{
    Action, ActionRef, AssetCollection, Constraint, Identifier, Operator, PartyCollection, Policy,
    Rule, RuleKind, Value,
};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::ParserOptions;

const LOGICAL_KEYS: [&str; 4] = ["and", "or", "xone", "andSequence"];

pub(crate) struct Decoder<'o> {
    options: &'o ParserOptions,
    path: Vec<String>,
    depth: usize,
}

impl<'o> Decoder<'o> {
    pub(crate) fn new(options: &'o ParserOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
            depth: 0,
        }
    }

    /// A single policy object or an array of them.
    pub(crate) fn decode_document(&mut self, document: &Json) -> Result<Vec<Policy>, ParseError> {
        match document {
            Json::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| self.scoped(idx, |d| d.decode_policy(item)))
                .collect(),
            Json::Object(_) => Ok(vec![self.decode_policy(document)?]),
            _ => Err(self.invalid_type("a policy object or an array of policies")),
        }
    }

    pub(crate) fn decode_policy(&mut self, value: &Json) -> Result<Policy, ParseError> {
        let object = self.object(value, "a policy object")?;

        let uid = match object.get("uid").or_else(|| object.get("@id")) {
            Some(uid) => self.scoped("uid", |d| d.string(uid))?,
            None => return Err(ParseError::missing(self.current_path(), "uid")),
        };

        let mut policy = Policy::new(uid);
        if let Some(kind) = object.get("@type").or_else(|| object.get("type")) {
            policy.policy_type = Some(self.scoped("@type", |d| d.string(kind))?);
        }
        if let Some(profiles) = object.get("profile").or_else(|| object.get("profiles")) {
            policy.profiles = self.scoped("profile", |d| d.strings(profiles))?;
        }
        if let Some(parents) = object.get("inheritFrom") {
            policy.inherit_from = self.scoped("inheritFrom", |d| d.strings(parents))?;
        }
        if let Some(conflict) = object.get("conflict") {
            policy.conflict = Some(self.scoped("conflict", |d| d.string(conflict))?);
        }

        for (key, kind) in [
            ("permission", RuleKind::Permission),
            ("prohibition", RuleKind::Prohibition),
            ("obligation", RuleKind::Obligation),
            ("duty", RuleKind::Duty),
        ] {
            if let Some(rules) = object.get(key) {
                for rule in self.scoped(key, |d| d.rules(rules, kind))? {
                    policy.add_rule(rule);
                }
            }
        }

        debug!(
            policy = %policy.uid,
            rules = policy.rule_count(),
            "Decoded policy"
        );
        Ok(policy)
    }

    fn rules(&mut self, value: &Json, kind: RuleKind) -> Result<Vec<Rule>, ParseError> {
        self.one_or_many(value, |d, item| d.decode_rule(item, kind))
    }

    fn decode_rule(&mut self, value: &Json, kind: RuleKind) -> Result<Rule, ParseError> {
        self.enter()?;
        let result = self.rule_fields(value, kind);
        self.depth -= 1;
        result
    }

    fn rule_fields(&mut self, value: &Json, kind: RuleKind) -> Result<Rule, ParseError> {
        let object = self.object(value, "a rule object")?;

        let action = match object.get("action") {
            Some(action) => self.scoped("action", |d| d.action_ref(action))?,
            None => return Err(ParseError::missing(self.current_path(), "action")),
        };
        let mut rule = Rule::new(kind, action);

        if let Some(uid) = object.get("uid").or_else(|| object.get("@id")) {
            rule.uid = Some(self.scoped("uid", |d| d.string(uid))?);
        }
        if let Some(target) = object.get("target") {
            rule.target = Some(self.scoped("target", |d| d.asset(target))?);
        }
        if let Some(assigner) = object.get("assigner") {
            rule.assigner = Some(self.scoped("assigner", |d| d.party(assigner))?);
        }
        if let Some(assignee) = object.get("assignee") {
            rule.assignee = Some(self.scoped("assignee", |d| d.party(assignee))?);
        }
        if let Some(constraints) = object.get("constraint") {
            rule.constraint = self.scoped("constraint", |d| d.constraints(constraints))?;
        }

        match kind {
            RuleKind::Permission => {
                if let Some(duties) = object.get("duty") {
                    let duties = self.scoped("duty", |d| d.rules(duties, RuleKind::Duty))?;
                    self.attach(rule.set_duty(duties))?;
                }
            }
            RuleKind::Prohibition => {
                if let Some(remedies) = object.get("remedy") {
                    let remedies = self.scoped("remedy", |d| d.rules(remedies, RuleKind::Duty))?;
                    self.attach(rule.set_remedy(remedies))?;
                }
            }
            RuleKind::Duty | RuleKind::Obligation => {
                if let Some(actions) = object.get("actions") {
                    for action in self.scoped("actions", |d| d.actions(actions))? {
                        self.attach(rule.add_action(action))?;
                    }
                }
                if let Some(consequences) = object.get("consequence") {
                    let consequences = self.scoped("consequence", |d| {
                        d.rules(consequences, RuleKind::Duty)
                    })?;
                    self.attach(rule.set_consequence(consequences))?;
                }
            }
        }

        trace!(
            path = %self.current_path(),
            kind = %kind,
            rule = rule.label(),
            "Decoded rule"
        );
        Ok(rule)
    }

    // --- Refinable entities ---

    fn action_ref(&mut self, value: &Json) -> Result<ActionRef, ParseError> {
        match value {
            Json::String(name) => Ok(ActionRef::Name(name.clone())),
            Json::Object(_) => Ok(ActionRef::Actions(vec![self.action(value)?])),
            Json::Array(_) => Ok(ActionRef::Actions(self.actions(value)?)),
            _ => Err(self.invalid_type("an action name, object or list")),
        }
    }

    fn actions(&mut self, value: &Json) -> Result<Vec<Action>, ParseError> {
        self.one_or_many(value, |d, item| d.action(item))
    }

    fn action(&mut self, value: &Json) -> Result<Action, ParseError> {
        let object = match value {
            Json::String(name) => return Ok(Action::new(name.clone())),
            Json::Object(object) => object,
            _ => return Err(self.invalid_type("an action name or object")),
        };

        let name = match ["value", "rdf:value", "source", "@id"]
            .iter()
            .find_map(|key| object.get(*key).map(|v| (*key, v)))
        {
            Some((key, name)) => self.scoped(key, |d| d.identifier(name))?,
            None => return Err(ParseError::missing(self.current_path(), "value")),
        };

        let mut action = Action::new(name);
        if let Some(refinement) = object.get("refinement") {
            action.refinement = self.scoped("refinement", |d| d.constraints(refinement))?;
        }
        if let Some(implied) = object.get("implies") {
            for name in self.scoped("implies", |d| d.strings(implied))? {
                action.add_implied_action(name);
            }
        }
        if let Some(parent) = object.get("includedIn") {
            action.included_in = Some(self.scoped("includedIn", |d| d.string(parent))?);
        }
        Ok(action)
    }

    fn asset(&mut self, value: &Json) -> Result<Identifier<AssetCollection>, ParseError> {
        match value {
            Json::String(source) => Ok(Identifier::Literal(source.clone())),
            Json::Object(object) => {
                let (source, uid, refinement) = self.collection_fields(object)?;
                Ok(Identifier::Composite(AssetCollection {
                    source,
                    uid,
                    refinement,
                }))
            }
            _ => Err(self.invalid_type("an asset identifier or collection")),
        }
    }

    fn party(&mut self, value: &Json) -> Result<Identifier<PartyCollection>, ParseError> {
        match value {
            Json::String(source) => Ok(Identifier::Literal(source.clone())),
            Json::Object(object) => {
                let (source, uid, refinement) = self.collection_fields(object)?;
                Ok(Identifier::Composite(PartyCollection {
                    source,
                    uid,
                    refinement,
                }))
            }
            _ => Err(self.invalid_type("a party identifier or collection")),
        }
    }

    fn collection_fields(
        &mut self,
        object: &Map<String, Json>,
    ) -> Result<(String, Option<String>, Vec<Constraint>), ParseError> {
        let uid = match object.get("uid") {
            Some(uid) => Some(self.scoped("uid", |d| d.string(uid))?),
            None => None,
        };
        let source = match object.get("source").or_else(|| object.get("@id")) {
            Some(source) => self.scoped("source", |d| d.string(source))?,
            None => match &uid {
                Some(uid) => uid.clone(),
                None => return Err(ParseError::missing(self.current_path(), "source")),
            },
        };
        let refinement = match object.get("refinement") {
            Some(refinement) => self.scoped("refinement", |d| d.constraints(refinement))?,
            None => Vec::new(),
        };
        Ok((source, uid, refinement))
    }

    // --- Constraints ---

    fn constraints(&mut self, value: &Json) -> Result<Vec<Constraint>, ParseError> {
        self.one_or_many(value, |d, item| d.constraint(item))
    }

    fn constraint(&mut self, value: &Json) -> Result<Constraint, ParseError> {
        let object = self.object(value, "a constraint object")?;

        // Shorthand logical form: {"and": [...]}
        if let Some((key, subs)) = object
            .iter()
            .find(|(key, _)| LOGICAL_KEYS.contains(&odrl_types::iri::term_name(key)))
        {
            let operator = Operator::parse(key);
            return self.scoped(key.as_str(), |d| d.compose(operator, subs, object));
        }

        let operator = match object.get("operator") {
            Some(operator) => Operator::parse(&self.scoped("operator", |d| d.identifier(operator))?),
            None => return Err(ParseError::missing(self.current_path(), "operator")),
        };

        if operator.is_logical() || (operator.is_unrecognized() && object.contains_key("constraint"))
        {
            return match object.get("constraint") {
                Some(subs) => self.scoped("constraint", |d| d.compose(operator, subs, object)),
                None => Err(ParseError::invalid_constraint(
                    self.current_path(),
                    format!("logical operator {} needs a constraint list", operator),
                )),
            };
        }

        let right = match object.get("rightOperand") {
            Some(right) => self.scoped("rightOperand", |d| d.operand(right))?,
            None => return Err(ParseError::missing(self.current_path(), "rightOperand")),
        };
        let mut constraint = Constraint::new(operator, right)
            .map_err(|err| ParseError::invalid_constraint(self.current_path(), err.to_string()))?;
        constraint = self.constraint_common(constraint, object)?;
        Ok(constraint)
    }

    fn compose(
        &mut self,
        operator: Operator,
        subs: &Json,
        object: &Map<String, Json>,
    ) -> Result<Constraint, ParseError> {
        self.enter()?;
        let subs = self.constraints(subs);
        self.depth -= 1;

        let constraint = Constraint::compose(operator, subs?)
            .map_err(|err| ParseError::invalid_constraint(self.current_path(), err.to_string()))?;
        self.constraint_common(constraint, object)
    }

    fn constraint_common(
        &mut self,
        mut constraint: Constraint,
        object: &Map<String, Json>,
    ) -> Result<Constraint, ParseError> {
        if let Some(left) = object.get("leftOperand") {
            constraint =
                constraint.with_left_operand(self.scoped("leftOperand", |d| d.identifier(left))?);
        }
        if let Some(uid) = object.get("uid").or_else(|| object.get("@id")) {
            constraint = constraint.with_uid(self.scoped("uid", |d| d.string(uid))?);
        }
        Ok(constraint)
    }

    fn operand(&mut self, value: &Json) -> Result<Value, ParseError> {
        match value {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(number) => match number.as_i64() {
                Some(int) => Ok(Value::Integer(int)),
                None => number
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| self.invalid_type("a finite number")),
            },
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| self.scoped(idx, |d| d.operand(item)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Json::Object(object) => match object.get("@value").or_else(|| object.get("@id")) {
                Some(inner) => self.operand(inner),
                None => Err(self.invalid_type("a literal, a list or an object with @value/@id")),
            },
            Json::Null => Err(self.invalid_type("a non-null operand")),
        }
    }

    // --- Scalars ---

    fn string(&self, value: &Json) -> Result<String, ParseError> {
        match value {
            Json::String(s) => Ok(s.clone()),
            _ => Err(self.invalid_type("a string")),
        }
    }

    /// A string, or an object carrying the string under `@id`.
    fn identifier(&mut self, value: &Json) -> Result<String, ParseError> {
        match value {
            Json::Object(object) => match object.get("@id") {
                Some(id) => self.scoped("@id", |d| d.string(id)),
                None => Err(self.invalid_type("a string or an object with @id")),
            },
            _ => self.string(value),
        }
    }

    fn strings(&mut self, value: &Json) -> Result<Vec<String>, ParseError> {
        self.one_or_many(value, |d, item| d.identifier(item))
    }

    // --- Plumbing ---

    /// Decode a single item or every item of an array.
    fn one_or_many<T>(
        &mut self,
        value: &Json,
        mut decode: impl FnMut(&mut Self, &Json) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        match value {
            Json::Array(items) => {
                let mut decoded = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    self.path.push(idx.to_string());
                    let result = decode(self, item);
                    self.path.pop();
                    decoded.push(result?);
                }
                Ok(decoded)
            }
            single => Ok(vec![decode(self, single)?]),
        }
    }

    fn scoped<T>(
        &mut self,
        segment: impl ToString,
        decode: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.path.push(segment.to_string());
        let result = decode(self);
        self.path.pop();
        result
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::TooDeep {
                path: self.current_path(),
                max_depth: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn attach(&self, result: Result<(), odrl_types::ModelError>) -> Result<(), ParseError> {
        result.map_err(|err| ParseError::invalid_constraint(self.current_path(), err.to_string()))
    }

    fn object<'v>(
        &self,
        value: &'v Json,
        expected: &'static str,
    ) -> Result<&'v Map<String, Json>, ParseError> {
        value.as_object().ok_or_else(|| self.invalid_type(expected))
    }

    fn invalid_type(&self, expected: &'static str) -> ParseError {
        ParseError::invalid_type(self.current_path(), expected)
    }

    fn current_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}
