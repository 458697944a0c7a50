//! Taxonomy lookup
//!
//! Flat label/URI tables for actions, actors and purposes, supplied by an
//! external ontology service. Lookups match the label or the URI,
//! ignoring ASCII case, and resolve to the label with spaces removed so it
//! can be used as a predicate name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::CompileError;

/// Resolve an identifier to its canonical label.
pub trait Taxonomy: Send + Sync {
    fn resolve(&self, identifier: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub uri: String,
    pub label: String,
}

impl TaxonomyEntry {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
        }
    }

    fn matches(&self, identifier: &str) -> bool {
        self.label.eq_ignore_ascii_case(identifier) || self.uri.eq_ignore_ascii_case(identifier)
    }
}

/// In-memory taxonomy table, first match wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomyTable {
    entries: Vec<TaxonomyEntry>,
}

impl TaxonomyTable {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of `{ "uri": ..., "label": ... }`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CompileError::TaxonomyIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| CompileError::TaxonomyFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_entry(mut self, uri: impl Into<String>, label: impl Into<String>) -> Self {
        self.entries.push(TaxonomyEntry::new(uri, label));
        self
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Taxonomy for TaxonomyTable {
    fn resolve(&self, identifier: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.matches(identifier))
            .map(|entry| entry.label.replace(' ', ""))
    }
}

/// The three lookups the compiler consults
#[derive(Clone)]
pub struct Taxonomies {
    pub actions: Arc<dyn Taxonomy>,
    pub actors: Arc<dyn Taxonomy>,
    pub purposes: Arc<dyn Taxonomy>,
}

impl Taxonomies {
    pub fn new(
        actions: impl Taxonomy + 'static,
        actors: impl Taxonomy + 'static,
        purposes: impl Taxonomy + 'static,
    ) -> Self {
        Self {
            actions: Arc::new(actions),
            actors: Arc::new(actors),
            purposes: Arc::new(purposes),
        }
    }

    /// Lookups that never resolve anything.
    pub fn empty() -> Self {
        Self::new(
            TaxonomyTable::default(),
            TaxonomyTable::default(),
            TaxonomyTable::default(),
        )
    }

    pub fn with_actions(mut self, actions: impl Taxonomy + 'static) -> Self {
        self.actions = Arc::new(actions);
        self
    }

    pub fn with_actors(mut self, actors: impl Taxonomy + 'static) -> Self {
        self.actors = Arc::new(actors);
        self
    }

    pub fn with_purposes(mut self, purposes: impl Taxonomy + 'static) -> Self {
        self.purposes = Arc::new(purposes);
        self
    }
}

impl Default for Taxonomies {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Taxonomies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Taxonomies").finish_non_exhaustive()
    }
}
