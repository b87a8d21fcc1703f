//! Dependency resolution - the direct neighborhood of one object
//!
//! Three discovery strategies feed one merged result:
//! 1. native catalog dependency records (rewrite rules),
//! 2. textual reference extraction from definition bodies,
//! 3. catalog re-validation of every textual candidate.
//!
//! Every catalog call is individually shielded: a failed step logs a
//! warning and contributes nothing, and the merged result of the
//! surviving steps is still returned. Only a dead connection at
//! construction time is fatal to a session.

use crate::catalog::Catalog;
use crate::extract::extract_references;
use crate::object::{ObjectDescriptor, ObjectKind};
use crate::relation::Relationship;
use std::collections::HashSet;

/// Resolves the direct dependency neighborhood of single objects.
pub struct DependencyResolver<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver over a catalog
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    /// The direct (depth 1) neighborhood of an object: everything it
    /// depends on and everything that uses it.
    ///
    /// Self-relationships are dropped and duplicates collapse on
    /// `(source, target, kind)`, first discovery winning. Given a stable
    /// catalog, two calls return identical sequences.
    pub async fn find_related(&self, obj: &ObjectDescriptor) -> Vec<Relationship> {
        let mut relationships = Vec::new();
        self.downstream(obj, &mut relationships).await;
        self.upstream(obj, &mut relationships).await;

        let mut seen = HashSet::new();
        relationships
            .into_iter()
            .filter(|rel| !rel.is_self_loop())
            .filter(|rel| seen.insert(rel.dedup_key()))
            .collect()
    }

    /// What `obj` depends on. Views and materialized views combine the
    /// native records with a definition scan; routines only have their
    /// definition text; tables, sequences and the rest have no downstream.
    async fn downstream(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        if matches!(obj.kind, ObjectKind::View | ObjectKind::MaterializedView) {
            self.native_dependencies(obj, out).await;
        }
        if obj.kind.has_body() {
            self.textual_dependencies(obj, out).await;
        }
    }

    async fn native_dependencies(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        let records = match self.catalog.direct_dependencies(&obj.key).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("Dependency record lookup failed for {}: {}", obj.id(), err);
                return;
            }
        };

        for target in records {
            out.push(
                Relationship::depends_on(obj.clone(), target)
                    .with_description("catalog dependency record"),
            );
        }
    }

    /// Extract candidates from the definition text, then trust only the
    /// ones the catalog confirms as relations.
    async fn textual_dependencies(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        let definition = self.catalog.definition_text(obj).await;

        for key in extract_references(&definition, obj.schema()) {
            let kind = match self.catalog.classify_relation(&key.schema, &key.name).await {
                Ok(Some(kind)) => kind,
                Ok(None) => {
                    tracing::debug!("Discarding unvalidated candidate {}", key);
                    continue;
                }
                Err(err) => {
                    tracing::warn!("Candidate validation failed for {}: {}", key, err);
                    continue;
                }
            };

            out.push(
                Relationship::depends_on(obj.clone(), ObjectDescriptor::from_key(key, kind))
                    .with_description("definition reference"),
            );
        }
    }

    /// What uses `obj`: recorded view dependents for everything, plus a
    /// schema-wide definition scan for relations, plus triggers for
    /// tables.
    async fn upstream(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        self.rule_dependents(obj, out).await;

        if obj.kind.is_relation() {
            self.definition_scans(obj, out).await;
        }

        if obj.kind == ObjectKind::Table {
            self.table_triggers(obj, out).await;
        }
    }

    async fn rule_dependents(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        let dependents = match self.catalog.dependents_via_rules(&obj.key).await {
            Ok(dependents) => dependents,
            Err(err) => {
                tracing::warn!("Dependent record lookup failed for {}: {}", obj.id(), err);
                return;
            }
        };

        for source in dependents {
            out.push(
                Relationship::used_by(obj.clone(), source)
                    .with_description("catalog dependency record"),
            );
        }
    }

    /// Scan every routine and view definition in the object's schema for
    /// its qualified name.
    async fn definition_scans(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        let needle = obj.id().to_lowercase();

        match self.catalog.routines_in_schema(obj.schema()).await {
            Ok(routines) => {
                for routine in routines {
                    let Some(definition) = routine.definition.as_deref() else {
                        continue;
                    };
                    if definition.to_lowercase().contains(&needle) {
                        out.push(
                            Relationship::used_by(obj.clone(), routine.into_descriptor())
                                .with_description("definition scan"),
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!("Routine scan failed for schema {}: {}", obj.schema(), err);
            }
        }

        match self.catalog.views_in_schema(obj.schema()).await {
            Ok(views) => {
                for view in views {
                    let Some(definition) = view.definition.as_deref() else {
                        continue;
                    };
                    if definition.to_lowercase().contains(&needle) {
                        out.push(
                            Relationship::used_by(obj.clone(), view.into_descriptor())
                                .with_description("definition scan"),
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!("View scan failed for schema {}: {}", obj.schema(), err);
            }
        }
    }

    async fn table_triggers(&self, obj: &ObjectDescriptor, out: &mut Vec<Relationship>) {
        let triggers = match self.catalog.triggers_on(&obj.key).await {
            Ok(triggers) => triggers,
            Err(err) => {
                tracing::warn!("Trigger lookup failed for {}: {}", obj.id(), err);
                return;
            }
        };

        for trigger in triggers {
            out.push(
                Relationship::used_by(obj.clone(), trigger).with_description("trigger on table"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::catalog::{DefinedObject, MemoryCatalog};
    use crate::key::ObjectKey;
    use crate::relation::RelationKind;
    use async_trait::async_trait;

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new("test_graph", name)
    }

    fn sample_catalog() -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("test_graph", "orders", None);
        catalog.add_table("test_graph", "users", None);
        catalog.add_view(
            "test_graph",
            "order_summary",
            "SELECT o.id, o.total FROM test_graph.orders o",
        );
        catalog.add_rule_dependency(key("order_summary"), key("orders"));
        catalog
    }

    #[tokio::test]
    async fn test_view_depends_on_its_table_exactly_once() {
        let catalog = sample_catalog();
        let resolver = DependencyResolver::new(&catalog);

        let view = ObjectDescriptor::new("test_graph", "order_summary", ObjectKind::View);
        let related = resolver.find_related(&view).await;

        // The native record and the textual reference collapse to one
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].kind, RelationKind::DependsOn);
        assert_eq!(related[0].source.name(), "order_summary");
        assert_eq!(related[0].target.name(), "orders");
        assert_eq!(related[0].depth, 1);
    }

    #[tokio::test]
    async fn test_table_is_used_by_its_view_exactly_once() {
        let catalog = sample_catalog();
        let resolver = DependencyResolver::new(&catalog);

        let table = ObjectDescriptor::new("test_graph", "orders", ObjectKind::Table);
        let related = resolver.find_related(&table).await;

        // Rule dependent and definition scan collapse to one
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].kind, RelationKind::UsedBy);
        assert_eq!(related[0].source.name(), "orders");
        assert_eq!(related[0].target.name(), "order_summary");
    }

    #[tokio::test]
    async fn test_materialized_view_combines_native_and_textual() {
        let mut catalog = sample_catalog();
        catalog.add_materialized_view(
            "test_graph",
            "daily_rollup",
            "SELECT o.id, count(*) FROM test_graph.orders o \
             JOIN test_graph.users u ON u.id = o.user_id GROUP BY 1",
        );
        catalog.add_rule_dependency(key("daily_rollup"), key("orders"));

        let resolver = DependencyResolver::new(&catalog);
        let matview =
            ObjectDescriptor::new("test_graph", "daily_rollup", ObjectKind::MaterializedView);
        let related = resolver.find_related(&matview).await;

        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|rel| rel.kind == RelationKind::DependsOn));

        let targets: Vec<_> = related.iter().map(|rel| rel.target.name()).collect();
        assert_eq!(targets, vec!["orders", "users"]);

        // The native record lands first and keeps its provenance over the
        // duplicate textual discovery of orders
        assert_eq!(
            related[0].description.as_deref(),
            Some("catalog dependency record")
        );
        assert_eq!(
            related[1].description.as_deref(),
            Some("definition reference")
        );
    }

    #[tokio::test]
    async fn test_function_candidates_validated_against_catalog() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("test_graph", "t1", None);
        catalog.add_function(
            "test_graph",
            "report",
            "CREATE FUNCTION test_graph.report() ... \
             SELECT * FROM test_graph.t1 JOIN test_graph.t2 ON true ...",
        );

        let resolver = DependencyResolver::new(&catalog);
        let function = ObjectDescriptor::new("test_graph", "report", ObjectKind::Function);
        let related = resolver.find_related(&function).await;

        // t2 does not exist, so only the t1 reference survives validation
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].kind, RelationKind::DependsOn);
        assert_eq!(related[0].target.name(), "t1");
    }

    #[tokio::test]
    async fn test_procedure_body_scanned_for_references() {
        let mut catalog = sample_catalog();
        catalog.add_procedure(
            "test_graph",
            "archive_orders",
            "CREATE PROCEDURE test_graph.archive_orders() ... \
             INSERT INTO test_graph.archive SELECT * FROM test_graph.orders ...",
        );

        let resolver = DependencyResolver::new(&catalog);
        let proc = ObjectDescriptor::new("test_graph", "archive_orders", ObjectKind::Procedure);
        let related = resolver.find_related(&proc).await;

        // test_graph.archive is not in the catalog, so only orders remains
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].kind, RelationKind::DependsOn);
        assert_eq!(related[0].target.name(), "orders");
        assert_eq!(related[0].target.kind, ObjectKind::Table);
    }

    #[tokio::test]
    async fn test_bare_names_qualified_with_object_schema() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("test_graph", "orders", None);
        catalog.add_view("test_graph", "recent", "SELECT * FROM orders WHERE ts > now()");

        let resolver = DependencyResolver::new(&catalog);
        let view = ObjectDescriptor::new("test_graph", "recent", ObjectKind::View);
        let related = resolver.find_related(&view).await;

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].target.id(), "test_graph.orders");
    }

    #[tokio::test]
    async fn test_self_references_dropped() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("test_graph", "base", None);
        catalog.add_view(
            "test_graph",
            "v_self",
            "SELECT * FROM test_graph.v_self UNION ALL SELECT * FROM test_graph.base",
        );

        let resolver = DependencyResolver::new(&catalog);
        let view = ObjectDescriptor::new("test_graph", "v_self", ObjectKind::View);
        let related = resolver.find_related(&view).await;

        assert!(related.iter().all(|rel| !rel.is_self_loop()));
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].target.name(), "base");
    }

    #[tokio::test]
    async fn test_tables_have_no_downstream() {
        let mut catalog = sample_catalog();
        // Even if a table definition somehow mentioned another relation,
        // tables are never scanned downstream
        catalog.add_table(
            "test_graph",
            "archive",
            Some("CREATE TABLE test_graph.archive (... FROM test_graph.orders ...)"),
        );

        let resolver = DependencyResolver::new(&catalog);
        let table = ObjectDescriptor::new("test_graph", "archive", ObjectKind::Table);
        let related = resolver.find_related(&table).await;

        assert!(related.iter().all(|rel| rel.kind == RelationKind::UsedBy));
    }

    #[tokio::test]
    async fn test_triggers_reported_for_tables() {
        let mut catalog = sample_catalog();
        catalog.add_trigger(key("orders"), "orders_audit");

        let resolver = DependencyResolver::new(&catalog);
        let table = ObjectDescriptor::new("test_graph", "orders", ObjectKind::Table);
        let related = resolver.find_related(&table).await;

        let trigger: Vec<_> = related
            .iter()
            .filter(|rel| rel.target.kind == ObjectKind::Trigger)
            .collect();
        assert_eq!(trigger.len(), 1);
        assert_eq!(trigger[0].target.name(), "orders_audit");
        assert_eq!(trigger[0].kind, RelationKind::UsedBy);
    }

    #[tokio::test]
    async fn test_sequence_upstream_via_records_only() {
        let mut catalog = sample_catalog();
        catalog.add_sequence("test_graph", "order_id_seq");
        catalog.add_rule_dependency(key("order_summary"), key("order_id_seq"));

        let resolver = DependencyResolver::new(&catalog);
        let seq = ObjectDescriptor::new("test_graph", "order_id_seq", ObjectKind::Sequence);
        let related = resolver.find_related(&seq).await;

        // No downstream and no definition scan for sequences; the rule
        // record still surfaces the consuming view
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].kind, RelationKind::UsedBy);
        assert_eq!(related[0].target.name(), "order_summary");
    }

    #[tokio::test]
    async fn test_function_using_view_found_by_scan() {
        let mut catalog = sample_catalog();
        catalog.add_function(
            "test_graph",
            "summarize",
            "CREATE FUNCTION ... SELECT * FROM test_graph.order_summary ...",
        );

        let resolver = DependencyResolver::new(&catalog);
        let view = ObjectDescriptor::new("test_graph", "order_summary", ObjectKind::View);
        let related = resolver.find_related(&view).await;

        let from_scan: Vec<_> = related
            .iter()
            .filter(|rel| rel.target.kind == ObjectKind::Function)
            .collect();
        assert_eq!(from_scan.len(), 1);
        assert_eq!(from_scan[0].target.name(), "summarize");
        assert_eq!(from_scan[0].kind, RelationKind::UsedBy);
    }

    /// A catalog where most steps fail; only the view scan answers.
    struct FlakyCatalog {
        views: MemoryCatalog,
    }

    fn backend_down() -> crate::Error {
        crate::Error::Catalog(sqlx::Error::PoolClosed)
    }

    #[async_trait]
    impl Catalog for FlakyCatalog {
        async fn classify(&self, _: &str, _: &str) -> Result<Option<ObjectKind>> {
            Err(backend_down())
        }

        async fn classify_relation(&self, _: &str, _: &str) -> Result<Option<ObjectKind>> {
            Err(backend_down())
        }

        async fn definition(&self, _: &ObjectDescriptor) -> Result<Option<String>> {
            Err(backend_down())
        }

        async fn direct_dependencies(&self, _: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
            Err(backend_down())
        }

        async fn dependents_via_rules(&self, _: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
            Err(backend_down())
        }

        async fn routines_in_schema(&self, _: &str) -> Result<Vec<DefinedObject>> {
            Err(backend_down())
        }

        async fn views_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>> {
            self.views.views_in_schema(schema).await
        }

        async fn triggers_on(&self, _: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
            Err(backend_down())
        }

        async fn list_schemas(&self) -> Result<Vec<String>> {
            Err(backend_down())
        }

        async fn list_objects(&self, _: &str) -> Result<Vec<ObjectDescriptor>> {
            Err(backend_down())
        }
    }

    #[tokio::test]
    async fn test_surviving_steps_still_contribute() {
        let mut views = MemoryCatalog::new();
        views.add_view(
            "test_graph",
            "order_summary",
            "SELECT * FROM test_graph.orders",
        );
        let catalog = FlakyCatalog { views };

        let resolver = DependencyResolver::new(&catalog);
        let table = ObjectDescriptor::new("test_graph", "orders", ObjectKind::Table);
        let related = resolver.find_related(&table).await;

        // Rule dependents and triggers failed; the view scan still lands
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].kind, RelationKind::UsedBy);
        assert_eq!(related[0].target.name(), "order_summary");
    }

    #[tokio::test]
    async fn test_results_are_deterministic() {
        let mut catalog = sample_catalog();
        catalog.add_view(
            "test_graph",
            "wide",
            "SELECT * FROM test_graph.users u JOIN test_graph.orders o ON o.user_id = u.id",
        );

        let resolver = DependencyResolver::new(&catalog);
        let view = ObjectDescriptor::new("test_graph", "wide", ObjectKind::View);

        let first = resolver.find_related(&view).await;
        let second = resolver.find_related(&view).await;

        let ids = |rels: &[Relationship]| -> Vec<String> {
            rels.iter()
                .map(|r| format!("{} {} {}", r.source.id(), r.kind, r.target.id()))
                .collect()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.len(), 2);
    }
}
