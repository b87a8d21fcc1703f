//! Fixture-backed catalog
//!
//! Answers every `Catalog` question from in-memory fixtures, with the
//! same observable semantics as the live backend: relation-first
//! classification, sorted scans, `Ok(None)` on misses. Used by tests and
//! offline experiments.

use crate::Result;
use crate::catalog::{Catalog, DefinedObject};
use crate::key::ObjectKey;
use crate::object::{ObjectDescriptor, ObjectKind};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct StoredObject {
    kind: ObjectKind,
    definition: Option<String>,
}

/// A catalog snapshot built from fixtures.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    /// Tables, views, materialized views, sequences (the relation namespace)
    relations: BTreeMap<ObjectKey, StoredObject>,
    /// Functions and procedures (the routine namespace)
    routines: BTreeMap<ObjectKey, StoredObject>,
    /// Native dependency records: (view/matview, relation it reads)
    rule_records: Vec<(ObjectKey, ObjectKey)>,
    /// Trigger names per table
    triggers: BTreeMap<ObjectKey, Vec<String>>,
}

impl MemoryCatalog {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, optionally with a synthesized definition
    pub fn add_table(&mut self, schema: &str, name: &str, definition: Option<&str>) {
        self.relations.insert(
            ObjectKey::new(schema, name),
            StoredObject {
                kind: ObjectKind::Table,
                definition: definition.map(str::to_string),
            },
        );
    }

    /// Add a view with its recorded definition
    pub fn add_view(&mut self, schema: &str, name: &str, definition: &str) {
        self.relations.insert(
            ObjectKey::new(schema, name),
            StoredObject {
                kind: ObjectKind::View,
                definition: Some(definition.to_string()),
            },
        );
    }

    /// Add a materialized view with its reconstructed definition
    pub fn add_materialized_view(&mut self, schema: &str, name: &str, definition: &str) {
        self.relations.insert(
            ObjectKey::new(schema, name),
            StoredObject {
                kind: ObjectKind::MaterializedView,
                definition: Some(definition.to_string()),
            },
        );
    }

    /// Add a sequence
    pub fn add_sequence(&mut self, schema: &str, name: &str) {
        self.relations.insert(
            ObjectKey::new(schema, name),
            StoredObject {
                kind: ObjectKind::Sequence,
                definition: None,
            },
        );
    }

    /// Add a function with its definition
    pub fn add_function(&mut self, schema: &str, name: &str, definition: &str) {
        self.routines.insert(
            ObjectKey::new(schema, name),
            StoredObject {
                kind: ObjectKind::Function,
                definition: Some(definition.to_string()),
            },
        );
    }

    /// Add a procedure with its definition
    pub fn add_procedure(&mut self, schema: &str, name: &str, definition: &str) {
        self.routines.insert(
            ObjectKey::new(schema, name),
            StoredObject {
                kind: ObjectKind::Procedure,
                definition: Some(definition.to_string()),
            },
        );
    }

    /// Record a native dependency: `source` (view/matview) reads `target`
    pub fn add_rule_dependency(&mut self, source: ObjectKey, target: ObjectKey) {
        self.rule_records.push((source, target));
    }

    /// Attach a user-level trigger to a table
    pub fn add_trigger(&mut self, table: ObjectKey, trigger_name: &str) {
        self.triggers
            .entry(table)
            .or_default()
            .push(trigger_name.to_string());
    }

    fn relation_descriptor(&self, key: &ObjectKey) -> Option<ObjectDescriptor> {
        self.relations
            .get(key)
            .map(|stored| ObjectDescriptor::from_key(key.clone(), stored.kind))
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn classify(&self, schema: &str, name: &str) -> Result<Option<ObjectKind>> {
        let key = ObjectKey::new(schema, name);
        // The relation namespace wins over the routine namespace
        if let Some(stored) = self.relations.get(&key) {
            return Ok(Some(stored.kind));
        }
        Ok(self.routines.get(&key).map(|stored| stored.kind))
    }

    async fn classify_relation(&self, schema: &str, name: &str) -> Result<Option<ObjectKind>> {
        let key = ObjectKey::new(schema, name);
        Ok(self
            .relations
            .get(&key)
            .map(|stored| stored.kind)
            .filter(|kind| kind.is_relation()))
    }

    async fn definition(&self, obj: &ObjectDescriptor) -> Result<Option<String>> {
        let stored = match obj.kind {
            ObjectKind::Function | ObjectKind::Procedure => self.routines.get(&obj.key),
            _ => self.relations.get(&obj.key),
        };
        Ok(stored.and_then(|s| s.definition.clone()))
    }

    async fn direct_dependencies(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
        let mut objects = Vec::new();
        for (source, target) in &self.rule_records {
            if source == key {
                if let Some(descriptor) = self.relation_descriptor(target) {
                    objects.push(descriptor);
                }
            }
        }
        Ok(objects)
    }

    async fn dependents_via_rules(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
        let mut objects = Vec::new();
        for (source, target) in &self.rule_records {
            if target == key {
                if let Some(descriptor) = self.relation_descriptor(source) {
                    if matches!(
                        descriptor.kind,
                        ObjectKind::View | ObjectKind::MaterializedView
                    ) {
                        objects.push(descriptor);
                    }
                }
            }
        }
        Ok(objects)
    }

    async fn routines_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>> {
        Ok(self
            .routines
            .iter()
            .filter(|(key, _)| key.schema == schema)
            .map(|(key, stored)| DefinedObject {
                key: key.clone(),
                kind: stored.kind,
                definition: stored.definition.clone(),
            })
            .collect())
    }

    async fn views_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>> {
        Ok(self
            .relations
            .iter()
            .filter(|(key, stored)| {
                key.schema == schema
                    && matches!(stored.kind, ObjectKind::View | ObjectKind::MaterializedView)
            })
            .map(|(key, stored)| DefinedObject {
                key: key.clone(),
                kind: stored.kind,
                definition: stored.definition.clone(),
            })
            .collect())
    }

    async fn triggers_on(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
        let Some(names) = self.triggers.get(key) else {
            return Ok(Vec::new());
        };
        Ok(names
            .iter()
            .map(|name| ObjectDescriptor::new(key.schema.as_str(), name, ObjectKind::Trigger))
            .collect())
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        let mut schemas = BTreeSet::new();
        for key in self.relations.keys().chain(self.routines.keys()) {
            schemas.insert(key.schema.clone());
        }
        Ok(schemas.into_iter().collect())
    }

    async fn list_objects(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        let mut objects: Vec<ObjectDescriptor> = self
            .relations
            .iter()
            .chain(self.routines.iter())
            .filter(|(key, _)| key.schema == schema)
            .map(|(key, stored)| ObjectDescriptor::from_key(key.clone(), stored.kind))
            .collect();
        objects.sort_by(|a, b| a.key.name.cmp(&b.key.name));
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("test_graph", "orders", Some("CREATE TABLE test_graph.orders (...);"));
        catalog.add_view(
            "test_graph",
            "order_summary",
            "SELECT * FROM test_graph.orders",
        );
        catalog.add_function(
            "test_graph",
            "total_orders",
            "CREATE FUNCTION ... SELECT count(*) FROM test_graph.orders ...",
        );
        catalog
    }

    #[tokio::test]
    async fn test_relation_wins_over_routine() {
        let mut catalog = sample_catalog();
        // A table and a function sharing the name "orders"
        catalog.add_function("test_graph", "orders", "CREATE FUNCTION ...");

        let kind = catalog.classify("test_graph", "orders").await.unwrap();
        assert_eq!(kind, Some(ObjectKind::Table));
    }

    #[tokio::test]
    async fn test_classify_miss_is_none() {
        let catalog = sample_catalog();
        let kind = catalog.classify("test_graph", "ghost").await.unwrap();
        assert_eq!(kind, None);
    }

    #[tokio::test]
    async fn test_classify_relation_rejects_routines() {
        let catalog = sample_catalog();
        let kind = catalog
            .classify_relation("test_graph", "total_orders")
            .await
            .unwrap();
        assert_eq!(kind, None);
    }

    #[tokio::test]
    async fn test_definition_text_placeholder_on_miss() {
        let catalog = sample_catalog();
        let ghost = ObjectDescriptor::new("test_graph", "ghost", ObjectKind::View);
        let text = catalog.definition_text(&ghost).await;
        assert!(text.contains("No definition found"));
        assert!(text.contains("test_graph.ghost"));
        assert!(text.contains("view"));
    }

    #[tokio::test]
    async fn test_rule_records_both_directions() {
        let mut catalog = sample_catalog();
        catalog.add_rule_dependency(
            ObjectKey::new("test_graph", "order_summary"),
            ObjectKey::new("test_graph", "orders"),
        );

        let deps = catalog
            .direct_dependencies(&ObjectKey::new("test_graph", "order_summary"))
            .await
            .unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name(), "orders");

        let dependents = catalog
            .dependents_via_rules(&ObjectKey::new("test_graph", "orders"))
            .await
            .unwrap();
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].name(), "order_summary");
    }

    #[tokio::test]
    async fn test_list_objects_sorted_by_name() {
        let catalog = sample_catalog();
        let objects = catalog.list_objects("test_graph").await.unwrap();
        let names: Vec<_> = objects.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["order_summary", "orders", "total_orders"]);
    }
}
