//! Target-language renderers
//!
//! Both forms render the same [`LoweredRule`]; they differ only in
//! operator symbols, relation naming and how the conjunction is assembled.

use odrl_types::Operator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;
use crate::lowering::{Atom, LoweredRule, Operand};

const UNKNOWN: &str = "Unknown";

pub trait Renderer: Send + Sync {
    fn render(&self, rule: &LoweredRule) -> String;
}

/// Output language of a compile call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// First-order logic: `Permission(Pe1) ∧ hasTarget(Pe1, x0) ∧ ...`
    #[default]
    Logic,
    /// Policy rule language: `Permission(Pe1) { has_target(Pe1, x0) && ... }`
    Rego,
}

impl Backend {
    pub fn renderer(&self) -> &'static dyn Renderer {
        match self {
            Backend::Logic => &LogicRenderer,
            Backend::Rego => &RegoRenderer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Logic => "logic",
            Backend::Rego => "rego",
        }
    }
}

impl FromStr for Backend {
    type Err = CompileError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "logic" | "fol" => Ok(Backend::Logic),
            "rego" => Ok(Backend::Rego),
            _ => Err(CompileError::UnknownBackend(raw.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Logic form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct LogicRenderer;

impl LogicRenderer {
    fn atom(&self, atom: &Atom) -> String {
        match atom {
            Atom::Head { kind, id } => format!("{}({})", kind, id),
            Atom::Relation {
                role,
                subject,
                object,
            } => format!("has{}({}, {})", capitalize(role), subject, object),
            Atom::Class { var, labels } => match labels {
                Operand::Single(label) => format!("{}({})", label, var),
                Operand::Set(labels) => format!(
                    "({})",
                    labels
                        .iter()
                        .map(|label| format!("{}({})", label, var))
                        .collect::<Vec<_>>()
                        .join(" ∨ ")
                ),
            },
            Atom::Compare {
                var,
                operator,
                operand,
            } => self.compare(var, operator, operand),
            Atom::Verbatim { term } => term.clone(),
        }
    }

    fn compare(&self, var: &str, operator: &Operator, operand: &Operand) -> String {
        match operator {
            Operator::IsAnyOf => group(&expand(var, operand, " ∨ "), operand),
            Operator::IsAllOf => group(&expand(var, operand, " ∧ "), operand),
            Operator::IsNoneOf => format!("¬({})", expand(var, operand, " ∨ ")),
            Operator::HasPart | Operator::IsPartOf => {
                format!("{}({}, {})", operator.token(), var, set_literal(operand))
            }
            other => format!("{} {} {}", var, logic_symbol(other), set_literal(operand)),
        }
    }
}

impl Renderer for LogicRenderer {
    fn render(&self, rule: &LoweredRule) -> String {
        rule.atoms
            .iter()
            .map(|atom| self.atom(atom))
            .collect::<Vec<_>>()
            .join(" ∧ ")
    }
}

fn logic_symbol(operator: &Operator) -> &'static str {
    match operator {
        Operator::Eq => "=",
        Operator::Gt => ">",
        Operator::Gteq => "≥",
        Operator::Lt => "<",
        Operator::Lteq => "≤",
        Operator::Neq => "≠",
        _ => UNKNOWN,
    }
}

// ---------------------------------------------------------------------------
// Rule-language form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct RegoRenderer;

impl RegoRenderer {
    fn atom(&self, atom: &Atom) -> String {
        match atom {
            Atom::Head { kind, id } => format!("{}({})", kind, id),
            Atom::Relation {
                role,
                subject,
                object,
            } => format!("has_{}({}, {})", snake_case(role), subject, object),
            Atom::Class { var, labels } => match labels {
                Operand::Single(label) => format!("{}({})", label, var),
                Operand::Set(_) => format!("{} in {}", var, set_literal(labels)),
            },
            Atom::Compare {
                var,
                operator,
                operand,
            } => match operator {
                Operator::IsAnyOf => format!("{} in {}", var, braced(operand)),
                Operator::IsAllOf => operand
                    .items()
                    .iter()
                    .map(|item| format!("{} == {}", var, item))
                    .collect::<Vec<_>>()
                    .join(" && "),
                Operator::IsNoneOf => format!("not {} in {}", var, braced(operand)),
                other => format!("{} {} {}", var, rego_symbol(other), set_literal(operand)),
            },
            Atom::Verbatim { term } => term.clone(),
        }
    }
}

impl Renderer for RegoRenderer {
    fn render(&self, rule: &LoweredRule) -> String {
        let mut atoms = rule.atoms.iter();
        let head = atoms.next().map(|atom| self.atom(atom)).unwrap_or_default();
        let body: Vec<String> = atoms.map(|atom| self.atom(atom)).collect();
        if body.is_empty() {
            format!("{} {{}}", head)
        } else {
            format!("{} {{ {} }}", head, body.join(" && "))
        }
    }
}

fn rego_symbol(operator: &Operator) -> &'static str {
    match operator {
        Operator::Eq => "==",
        Operator::Gt => ">",
        Operator::Gteq => ">=",
        Operator::Lt => "<",
        Operator::Lteq => "<=",
        Operator::Neq => "!=",
        _ => UNKNOWN,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `x = a ∨ x = b`, one equality per element.
fn expand(var: &str, operand: &Operand, joiner: &str) -> String {
    operand
        .items()
        .iter()
        .map(|item| format!("{} = {}", var, item))
        .collect::<Vec<_>>()
        .join(joiner)
}

/// Parenthesize a multi-element expansion.
fn group(expansion: &str, operand: &Operand) -> String {
    match operand {
        Operand::Set(items) if items.len() > 1 => format!("({})", expansion),
        _ => expansion.to_string(),
    }
}

/// `a` for a single operand, `{a, b}` for a set.
fn set_literal(operand: &Operand) -> String {
    match operand {
        Operand::Single(item) => item.clone(),
        Operand::Set(items) => format!("{{{}}}", items.join(", ")),
    }
}

/// `{a, b}` whatever the operand's shape.
fn braced(operand: &Operand) -> String {
    format!("{{{}}}", operand.items().join(", "))
}

/// `dateTime` → `Datetime`
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `spatialCoverage` → `spatial_coverage`
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if idx > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}
