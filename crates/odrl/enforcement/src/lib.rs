//! # ODRL Enforcement
//!
//! Decides whether a requested action is permitted under a set of policies.
//!
//! ## Decision procedure
//!
//! - A rule applies when its target and assigner equal the request's, its
//!   assignee equals the request's assignee (when one is given), and its
//!   action names the requested action.
//! - A matching permission decides first. It is **Permitted** only when its
//!   constraints hold and its duties are fulfilled in the request context;
//!   otherwise **Undetermined** with the reason.
//! - Without a matching permission, a matching prohibition is **Prohibited**.
//! - Anything else is **Undetermined** ("No applicable permission found").
//!   Absence of a permission is never treated as permission.
//!
//! Enforcement never fails: every outcome is a [`Decision`].
//!
//! ## Example
//!
//! ```rust
//! use odrl_enforcement::{AccessRequest, Outcome, PolicyEnforcement};
//! use odrl_types::{Policy, Rule};
//!
//! let policy = Policy::new("urn:policy:1")
//!     .with_rule(Rule::permission("read").with_target("urn:doc").with_assigner("urn:org"))
//!     .with_rule(Rule::prohibition("write").with_target("urn:doc").with_assigner("urn:org"));
//! let engine = PolicyEnforcement::new(vec![policy]);
//!
//! let read = AccessRequest::new("read", "urn:doc", "urn:org");
//! assert_eq!(engine.enforce(&read).outcome(), Outcome::Permitted);
//!
//! let write = AccessRequest::new("write", "urn:doc", "urn:org");
//! assert_eq!(engine.enforce(&write).outcome(), Outcome::Prohibited);
//! ```

#![deny(unsafe_code)]

pub mod decision;
pub mod engine;
pub mod request;

pub use decision::{Decision, Outcome, NO_APPLICABLE_PERMISSION};
pub use engine::{PolicyEnforcement, RuleMatch};
pub use request::AccessRequest;
