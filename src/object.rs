//! Object types - the typed model of PostgreSQL schema objects
//!
//! Every catalog entity the engine works with is one of ten kinds:
//! tables, views, materialized views, functions, procedures, triggers,
//! sequences, types, indexes and constraints. There is deliberately no
//! catch-all variant; a kind code the engine does not recognize is a
//! classification failure, not a new kind.

use crate::key::ObjectKey;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of object kinds the engine resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Plain or partitioned table
    Table,
    /// View backed by a rewrite rule
    View,
    /// Materialized view
    MaterializedView,
    /// SQL or PL function
    Function,
    /// Stored procedure
    Procedure,
    /// Table trigger
    Trigger,
    /// Sequence
    Sequence,
    /// Composite type
    Type,
    /// Index
    Index,
    /// Table or domain constraint
    Constraint,
}

impl ObjectKind {
    /// Get the string representation of the object kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::MaterializedView => "materialized_view",
            ObjectKind::Function => "function",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Trigger => "trigger",
            ObjectKind::Sequence => "sequence",
            ObjectKind::Type => "type",
            ObjectKind::Index => "index",
            ObjectKind::Constraint => "constraint",
        }
    }

    /// Get all object kinds
    pub fn all() -> &'static [ObjectKind] {
        &[
            ObjectKind::Table,
            ObjectKind::View,
            ObjectKind::MaterializedView,
            ObjectKind::Function,
            ObjectKind::Procedure,
            ObjectKind::Trigger,
            ObjectKind::Sequence,
            ObjectKind::Type,
            ObjectKind::Index,
            ObjectKind::Constraint,
        ]
    }

    /// Map a `pg_class.relkind` code. Unknown codes are `None`.
    pub fn from_relkind(code: &str) -> Option<ObjectKind> {
        match code {
            "r" | "p" => Some(ObjectKind::Table),
            "v" => Some(ObjectKind::View),
            "m" => Some(ObjectKind::MaterializedView),
            "S" => Some(ObjectKind::Sequence),
            "i" => Some(ObjectKind::Index),
            "c" => Some(ObjectKind::Type),
            _ => None,
        }
    }

    /// Map a `pg_proc.prokind` code. Unknown codes are `None`.
    pub fn from_prokind(code: &str) -> Option<ObjectKind> {
        match code {
            "f" | "a" | "w" => Some(ObjectKind::Function),
            "p" => Some(ObjectKind::Procedure),
            _ => None,
        }
    }

    /// Relation kinds: the only kinds a textual candidate may validate to
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            ObjectKind::Table | ObjectKind::View | ObjectKind::MaterializedView
        )
    }

    /// Kinds whose definitions are scanned for textual references
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            ObjectKind::View
                | ObjectKind::MaterializedView
                | ObjectKind::Function
                | ObjectKind::Procedure
        )
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" | "tbl" | "relation" => Ok(ObjectKind::Table),
            "view" => Ok(ObjectKind::View),
            "materialized_view" | "materialized view" | "matview" | "mview" => {
                Ok(ObjectKind::MaterializedView)
            }
            "function" | "func" | "fn" => Ok(ObjectKind::Function),
            "procedure" | "proc" => Ok(ObjectKind::Procedure),
            "trigger" => Ok(ObjectKind::Trigger),
            "sequence" | "seq" => Ok(ObjectKind::Sequence),
            "type" | "composite" => Ok(ObjectKind::Type),
            "index" | "idx" => Ok(ObjectKind::Index),
            "constraint" => Ok(ObjectKind::Constraint),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A schema object in the dependency graph.
///
/// Identity is the `(schema, name)` key alone: two descriptors for the
/// same key are the same object even when only one of them carries a
/// fetched definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Unique identifier for this object
    pub key: ObjectKey,
    /// The kind of object (table, view, function, ...)
    pub kind: ObjectKind,
    /// Definition text; empty until fetched lazily
    #[serde(default)]
    pub definition: String,
}

impl ObjectDescriptor {
    /// Create a new descriptor with an unfetched definition
    pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            key: ObjectKey::new(schema, name),
            kind,
            definition: String::new(),
        }
    }

    /// Create a descriptor from an existing key
    pub fn from_key(key: ObjectKey, kind: ObjectKind) -> Self {
        Self {
            key,
            kind,
            definition: String::new(),
        }
    }

    /// Set the definition text
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// The schema this object lives in
    pub fn schema(&self) -> &str {
        &self.key.schema
    }

    /// The object name within its schema
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// The textual id: `schema.name`
    pub fn id(&self) -> String {
        self.key.id()
    }

    /// Whether the definition has been fetched yet
    pub fn has_definition(&self) -> bool {
        !self.definition.is_empty()
    }
}

impl PartialEq for ObjectDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ObjectDescriptor {}

impl std::hash::Hash for ObjectDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
