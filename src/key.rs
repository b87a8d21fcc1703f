//! Object key - stable identity for every object in the dependency graph
//!
//! Format: `<schema>.<name>`
//!
//! Examples:
//! - `public.orders`
//! - `test_graph.order_summary`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable `(schema, name)` identity for a database object.
///
/// This key is the primary identity for:
/// - Descriptors
/// - Graph nodes and edges
/// - Visited sets during expansion
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Schema the object lives in
    pub schema: String,
    /// Object name within the schema
    pub name: String,
}

impl ObjectKey {
    /// Create a new ObjectKey
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse a key from `schema.name` or a bare `name`.
    ///
    /// A bare name is qualified with `default_schema`. Only the first dot
    /// separates schema from name.
    pub fn parse(text: &str, default_schema: &str) -> Result<Self> {
        let text = text.trim();
        let (schema, name) = match text.split_once('.') {
            Some((schema, name)) => (schema, name),
            None => (default_schema, text),
        };

        if schema.is_empty() || name.is_empty() {
            return Err(Error::InvalidName(text.to_string()));
        }

        Ok(Self::new(schema, name))
    }

    /// The textual id used on the wire and in logs: `schema.name`
    pub fn id(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Lowercased copy of this key, the form the extractor emits
    pub fn to_lowercase(&self) -> Self {
        Self {
            schema: self.schema.to_lowercase(),
            name: self.name.to_lowercase(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

impl FromStr for ObjectKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((schema, name)) if !schema.is_empty() && !name.is_empty() => {
                Ok(Self::new(schema, name))
            }
            _ => Err(Error::InvalidName(s.to_string())),
        }
    }
}

impl Serialize for ObjectKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for ObjectKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
