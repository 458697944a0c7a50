//! ODRL Compiler - lowers policies into logic and rule-language expressions.
//!
//! Each prohibition, permission and obligation of a policy (in that order)
//! becomes one conjunctive expression over existential variables. Target,
//! actor, action and constraint identifiers are abbreviated to their IRI
//! fragment or resolved through [`Taxonomies`]. A rule that cannot be
//! lowered is dropped with a [`RuleDiagnostic`]; the rest of the batch
//! still compiles.
//!
//! ```rust
//! use odrl_compiler::{compile, Backend, Taxonomies};
//! use odrl_types::{Policy, Rule};
//!
//! let policy = Policy::new("urn:policy:1")
//!     .with_rule(Rule::permission("read").with_target("http://example.com/data#Dataset"));
//!
//! let logic = compile(&[policy.clone()], &Taxonomies::empty(), Backend::Logic);
//! assert_eq!(logic.texts(), vec!["Permission(Pe1) ∧ hasTarget(Pe1, x0) ∧ Dataset(x0)"]);
//!
//! let rego = compile(&[policy], &Taxonomies::empty(), Backend::Rego);
//! assert_eq!(rego.texts(), vec!["Permission(Pe1) { has_target(Pe1, x0) && Dataset(x0) }"]);
//! ```

#![deny(unsafe_code)]

pub mod compiler;
pub mod error;
pub mod lowering;
pub mod query;
pub mod render;
pub mod taxonomy;

pub use compiler::{compile, CompileReport, LogicCompiler, RenderedRule, RuleDiagnostic};
pub use error::{CompileError, LoweringError};
pub use lowering::{Atom, LoweredRule, Operand};
pub use query::{parse_query, TargetQuery};
pub use render::{Backend, LogicRenderer, RegoRenderer, Renderer};
pub use taxonomy::{Taxonomies, Taxonomy, TaxonomyEntry, TaxonomyTable};
