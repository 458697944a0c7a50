//! ODRL Types - the rights-expression object model.
//!
//! Policies are built once from a declarative document and then read by the
//! enforcement engine and the logic compiler. This crate owns the shapes they
//! share:
//!
//! - [`Constraint`]: recursive boolean expression tree with a left-operand gate
//! - [`Action`], [`AssetCollection`], [`PartyCollection`]: [`Refinable`] entities
//! - [`Rule`]: permission, prohibition, duty or obligation, with its lifecycle state
//! - [`Policy`]: typed rule lists plus policy metadata
//!
//! ## Example
//!
//! ```rust
//! use odrl_types::{Constraint, Operator, Policy, Rule, Value};
//!
//! let adults = Constraint::new(Operator::Gteq, 18)
//!     .unwrap()
//!     .with_left_operand("age");
//!
//! let mut policy = Policy::new("urn:policy:1");
//! policy.add_rule(
//!     Rule::permission("read")
//!         .with_target("urn:dataset:climate")
//!         .with_assigner("urn:party:ministry")
//!         .with_constraint(adults),
//! );
//!
//! let read = &policy.permission[0];
//! assert!(read.constraint[0].evaluate("age", &Value::from(21)));
//! assert!(!read.constraint[0].evaluate("height", &Value::from(21)));
//! ```

#![deny(unsafe_code)]

pub mod constraint;
pub mod context;
pub mod error;
pub mod iri;
pub mod operator;
pub mod policy;
pub mod refinable;
pub mod rule;
pub mod value;

pub use constraint::Constraint;
pub use context::EvaluationContext;
pub use error::ModelError;
pub use iri::{local_name, term_name};
pub use operator::Operator;
pub use policy::Policy;
pub use refinable::{Action, ActionRef, AssetCollection, Identifier, PartyCollection, Refinable};
pub use rule::{ConsequenceWalk, Rule, RuleBody, RuleKind, RuleState};
pub use value::{Value, ValueKind};
