//! Embedded relational queries
//!
//! A rule may carry an `ex:query` constraint whose right operand is a
//! datalog-style query such as `Q(a, b) :- Table1(a, c), Table2(c, b)`.
//! The head names the rule subject, the head arguments become the target
//! binding, and every `Table<N>(...)` term of the body is kept verbatim.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::LoweringError;

static TABLE_TERM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Table\d+\([^)]+\)").ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    /// Predicate name of the head, e.g. `Q`
    pub head: String,
    /// Head argument list without parentheses, e.g. `a, b`
    pub inputs: String,
    /// `Table<N>(...)` terms of the body, in order
    pub tables: Vec<String>,
}

/// Split a query into head, inputs and table terms.
pub fn parse_query(text: &str) -> Result<TargetQuery, LoweringError> {
    let (head, body) = text
        .split_once(":-")
        .ok_or_else(|| LoweringError::malformed_query(text, "missing `:-`"))?;

    let (name, args) = head
        .split_once('(')
        .ok_or_else(|| LoweringError::malformed_query(text, "head has no argument list"))?;
    let inputs = args.replace(')', "").trim().to_string();

    let tables = match TABLE_TERM.as_ref() {
        Some(pattern) => pattern
            .find_iter(body)
            .map(|m| m.as_str().trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    Ok(TargetQuery {
        head: name.trim().to_string(),
        inputs,
        tables,
    })
}
