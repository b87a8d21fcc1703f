//! Catalog introspection - the seam between the engine and PostgreSQL
//!
//! The `Catalog` trait is everything the resolver needs from a backend:
//! classification, definitions, native dependency records and schema-wide
//! scans. `PgCatalog` talks to a live database; `MemoryCatalog` answers
//! from fixtures with the same observable semantics.

mod memory;
mod postgres;
pub mod queries;

pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;

use crate::Result;
use crate::key::ObjectKey;
use crate::object::{ObjectDescriptor, ObjectKind};
use async_trait::async_trait;

/// A schema-wide scan row: an object plus the definition text the
/// backend could produce for it.
#[derive(Debug, Clone)]
pub struct DefinedObject {
    pub key: ObjectKey,
    pub kind: ObjectKind,
    pub definition: Option<String>,
}

impl DefinedObject {
    /// Turn the scan row into a descriptor carrying its definition
    pub fn into_descriptor(self) -> ObjectDescriptor {
        let descriptor = ObjectDescriptor::from_key(self.key, self.kind);
        match self.definition {
            Some(text) => descriptor.with_definition(text),
            None => descriptor,
        }
    }
}

/// Read-only access to a PostgreSQL catalog (or a stand-in).
///
/// All methods are fallible lookups: a miss is `Ok(None)` or an empty
/// vector, never an error. Errors mean the backend itself failed.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Determine the kind of a named object. When a relation and a
    /// routine share a name, the relation wins.
    async fn classify(&self, schema: &str, name: &str) -> Result<Option<ObjectKind>>;

    /// Classification restricted to Table / View / MaterializedView,
    /// used to validate textual candidates.
    async fn classify_relation(&self, schema: &str, name: &str) -> Result<Option<ObjectKind>>;

    /// The canonical definition text of an object, if its kind has one
    async fn definition(&self, obj: &ObjectDescriptor) -> Result<Option<String>>;

    /// Relations the object's rewrite rules depend on (normal,
    /// non-internal dependency records)
    async fn direct_dependencies(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>>;

    /// Views and materialized views whose rewrite rules reference the
    /// object
    async fn dependents_via_rules(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>>;

    /// Every function and procedure in a schema, with definitions
    async fn routines_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>>;

    /// Every view and materialized view in a schema, with definitions
    async fn views_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>>;

    /// User-level triggers attached to a table
    async fn triggers_on(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>>;

    /// User-visible schemas, sorted
    async fn list_schemas(&self) -> Result<Vec<String>>;

    /// Objects in a schema, sorted by name
    async fn list_objects(&self, schema: &str) -> Result<Vec<ObjectDescriptor>>;

    /// Definition text that always prints.
    ///
    /// A lookup miss yields a placeholder naming the object and kind; a
    /// backend error yields a placeholder embedding the error text.
    async fn definition_text(&self, obj: &ObjectDescriptor) -> String {
        match self.definition(obj).await {
            Ok(Some(text)) => text,
            Ok(None) => format!("-- No definition found for {} {}", obj.kind, obj.id()),
            Err(err) => format!("-- Failed to fetch definition for {}: {}", obj.id(), err),
        }
    }
}
