//! PostgreSQL-backed catalog
//!
//! Thin query layer over a sqlx pool. Every method is one bind-parameter
//! round trip against the system catalogs; kind codes are mapped to the
//! typed model here, and rows that do not map are skipped with a log.

use crate::Result;
use crate::catalog::{Catalog, DefinedObject, queries};
use crate::key::ObjectKey;
use crate::object::{ObjectDescriptor, ObjectKind};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Live catalog access over a PostgreSQL connection pool.
///
/// The pool is capped at one connection by default: the engine never
/// needs more than sequential reuse of a single connection, and a cap of
/// one keeps resolution sessions strictly ordered.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Connect with the default single-connection cap
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(url, 1).await
    }

    /// Connect with an explicit connection cap
    pub async fn connect_with(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;

        tracing::debug!("Connected to PostgreSQL catalog");
        Ok(Self { pool })
    }
}

/// Map a `(namespace, code)` pair from the classification queries
fn kind_from_codes(namespace: &str, code: &str) -> Option<ObjectKind> {
    match namespace {
        "relation" => ObjectKind::from_relkind(code),
        "routine" => ObjectKind::from_prokind(code),
        _ => None,
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn classify(&self, schema: &str, name: &str) -> Result<Option<ObjectKind>> {
        let row = sqlx::query(queries::CLASSIFY_OBJECT)
            .bind(schema)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let namespace: String = row.try_get("namespace")?;
        let code: String = row.try_get("code")?;

        match kind_from_codes(&namespace, &code) {
            Some(kind) => Ok(Some(kind)),
            None => {
                tracing::debug!(
                    "Unmapped {} kind code '{}' for {}.{}",
                    namespace,
                    code,
                    schema,
                    name
                );
                Ok(None)
            }
        }
    }

    async fn classify_relation(&self, schema: &str, name: &str) -> Result<Option<ObjectKind>> {
        let row = sqlx::query(queries::CLASSIFY_RELATION)
            .bind(schema)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let code: String = row.try_get("code")?;
                Ok(ObjectKind::from_relkind(&code))
            }
            None => Ok(None),
        }
    }

    async fn definition(&self, obj: &ObjectDescriptor) -> Result<Option<String>> {
        let query = match obj.kind {
            ObjectKind::View => queries::VIEW_DEFINITION,
            ObjectKind::MaterializedView => queries::MATVIEW_DEFINITION,
            ObjectKind::Function | ObjectKind::Procedure => queries::ROUTINE_DEFINITION,
            ObjectKind::Table => queries::TABLE_DEFINITION,
            _ => return Ok(None),
        };

        let row = sqlx::query(query)
            .bind(obj.schema())
            .bind(obj.name())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get::<Option<String>, _>(0)?),
            None => Ok(None),
        }
    }

    async fn direct_dependencies(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
        let rows = sqlx::query(queries::RULE_DEPENDENCIES)
            .bind(key.schema.as_str())
            .bind(key.name.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut objects = Vec::new();
        for row in rows {
            let schema: String = row.try_get("schema")?;
            let name: String = row.try_get("name")?;
            let code: String = row.try_get("code")?;
            match ObjectKind::from_relkind(&code) {
                Some(kind) => objects.push(ObjectDescriptor::new(schema, name, kind)),
                None => {
                    tracing::debug!(
                        "Skipping dependency {}.{} with unmapped relkind '{}'",
                        schema,
                        name,
                        code
                    );
                }
            }
        }
        Ok(objects)
    }

    async fn dependents_via_rules(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
        let rows = sqlx::query(queries::RULE_DEPENDENTS)
            .bind(key.schema.as_str())
            .bind(key.name.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut objects = Vec::new();
        for row in rows {
            let schema: String = row.try_get("schema")?;
            let name: String = row.try_get("name")?;
            let code: String = row.try_get("code")?;
            match ObjectKind::from_relkind(&code) {
                Some(kind) => objects.push(ObjectDescriptor::new(schema, name, kind)),
                None => {
                    tracing::debug!(
                        "Skipping dependent {}.{} with unmapped relkind '{}'",
                        schema,
                        name,
                        code
                    );
                }
            }
        }
        Ok(objects)
    }

    async fn routines_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>> {
        let rows = sqlx::query(queries::ROUTINES_IN_SCHEMA)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        let mut routines = Vec::new();
        for row in rows {
            let schema: String = row.try_get("schema")?;
            let name: String = row.try_get("name")?;
            let code: String = row.try_get("code")?;
            let definition: Option<String> = row.try_get("definition")?;
            match ObjectKind::from_prokind(&code) {
                Some(kind) => routines.push(DefinedObject {
                    key: ObjectKey::new(schema, name),
                    kind,
                    definition,
                }),
                None => {
                    tracing::debug!("Skipping routine {}.{} with prokind '{}'", schema, name, code);
                }
            }
        }
        Ok(routines)
    }

    async fn views_in_schema(&self, schema: &str) -> Result<Vec<DefinedObject>> {
        let rows = sqlx::query(queries::VIEWS_IN_SCHEMA)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        let mut views = Vec::new();
        for row in rows {
            let schema: String = row.try_get("schema")?;
            let name: String = row.try_get("name")?;
            let code: String = row.try_get("code")?;
            let definition: Option<String> = row.try_get("definition")?;
            match ObjectKind::from_relkind(&code) {
                Some(kind) => views.push(DefinedObject {
                    key: ObjectKey::new(schema, name),
                    kind,
                    definition,
                }),
                None => {
                    tracing::debug!("Skipping view {}.{} with relkind '{}'", schema, name, code);
                }
            }
        }
        Ok(views)
    }

    async fn triggers_on(&self, key: &ObjectKey) -> Result<Vec<ObjectDescriptor>> {
        let rows = sqlx::query(queries::TRIGGERS_ON_TABLE)
            .bind(key.schema.as_str())
            .bind(key.name.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut triggers = Vec::new();
        for row in rows {
            let schema: String = row.try_get("schema")?;
            let name: String = row.try_get("name")?;
            triggers.push(ObjectDescriptor::new(schema, name, ObjectKind::Trigger));
        }
        Ok(triggers)
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(queries::LIST_SCHEMAS)
            .fetch_all(&self.pool)
            .await?;

        let mut schemas = Vec::new();
        for row in rows {
            schemas.push(row.try_get("nspname")?);
        }
        Ok(schemas)
    }

    async fn list_objects(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        let rows = sqlx::query(queries::LIST_OBJECTS)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        let mut objects = Vec::new();
        for row in rows {
            let name: String = row.try_get("name")?;
            let namespace: String = row.try_get("namespace")?;
            let code: String = row.try_get("code")?;
            match kind_from_codes(&namespace, &code) {
                Some(kind) => objects.push(ObjectDescriptor::new(schema, name, kind)),
                None => {
                    tracing::debug!(
                        "Skipping object {}.{} with unmapped {} code '{}'",
                        schema,
                        name,
                        namespace,
                        code
                    );
                }
            }
        }
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_codes() {
        assert_eq!(kind_from_codes("relation", "r"), Some(ObjectKind::Table));
        assert_eq!(kind_from_codes("relation", "v"), Some(ObjectKind::View));
        assert_eq!(kind_from_codes("routine", "f"), Some(ObjectKind::Function));
        assert_eq!(kind_from_codes("routine", "p"), Some(ObjectKind::Procedure));
        // A routine code never maps through the relation namespace
        assert_eq!(kind_from_codes("relation", "f"), None);
        assert_eq!(kind_from_codes("other", "r"), None);
    }
}
