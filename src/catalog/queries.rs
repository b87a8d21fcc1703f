//! Catalog query text
//!
//! Every PostgreSQL query the engine runs, as named constants. All of
//! them are plain bind-parameter queries ($1 = schema, $2 = name where
//! applicable); identifiers are never interpolated. Kind codes come back
//! as raw `relkind`/`prokind` text and are mapped in Rust.

/// Classify a named object. Relations and routines are probed in one
/// round trip; the rank column makes the relation namespace win when a
/// relation and a routine share a name.
pub const CLASSIFY_OBJECT: &str = r#"
SELECT kind.namespace, kind.code
FROM (
    SELECT 'relation' AS namespace, c.relkind::text AS code, 0 AS rank
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1 AND c.relname = $2
    UNION ALL
    SELECT 'routine' AS namespace, p.prokind::text AS code, 1 AS rank
    FROM pg_proc p
    JOIN pg_namespace n ON n.oid = p.pronamespace
    WHERE n.nspname = $1 AND p.proname = $2
) kind
ORDER BY kind.rank
LIMIT 1
"#;

/// Classify restricted to relation kinds, for validating textual
/// candidates.
pub const CLASSIFY_RELATION: &str = r#"
SELECT c.relkind::text AS code
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2
  AND c.relkind IN ('r', 'p', 'v', 'm')
LIMIT 1
"#;

/// The recorded definition of a plain view
pub const VIEW_DEFINITION: &str = r#"
SELECT view_definition
FROM information_schema.views
WHERE table_schema = $1 AND table_name = $2
"#;

/// The reconstructed definition of a materialized view
pub const MATVIEW_DEFINITION: &str = r#"
SELECT pg_get_viewdef(c.oid, true) AS definition
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2 AND c.relkind = 'm'
"#;

/// The reconstructed definition of a function or procedure
pub const ROUTINE_DEFINITION: &str = r#"
SELECT pg_get_functiondef(p.oid) AS definition
FROM pg_proc p
JOIN pg_namespace n ON n.oid = p.pronamespace
WHERE n.nspname = $1 AND p.proname = $2 AND p.prokind IN ('f', 'p')
LIMIT 1
"#;

/// A synthesized CREATE TABLE rendering of live column metadata
pub const TABLE_DEFINITION: &str = r#"
SELECT 'CREATE TABLE ' || n.nspname || '.' || c.relname || E' (\n'
       || string_agg(
              '    ' || a.attname || ' ' || pg_catalog.format_type(a.atttypid, a.atttypmod),
              E',\n' ORDER BY a.attnum)
       || E'\n);' AS definition
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
JOIN pg_attribute a ON a.attrelid = c.oid
WHERE n.nspname = $1 AND c.relname = $2
  AND a.attnum > 0
  AND NOT a.attisdropped
GROUP BY n.nspname, c.relname
"#;

/// Relations an object's rewrite rules depend on (what a view reads)
pub const RULE_DEPENDENCIES: &str = r#"
SELECT DISTINCT n.nspname AS schema, c.relname AS name, c.relkind::text AS code
FROM pg_rewrite rw
JOIN pg_class src ON src.oid = rw.ev_class
JOIN pg_namespace srcn ON srcn.oid = src.relnamespace
JOIN pg_depend d ON d.objid = rw.oid
JOIN pg_class c ON c.oid = d.refobjid
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE srcn.nspname = $1
  AND src.relname = $2
  AND d.deptype = 'n'
  AND c.relkind IN ('r', 'p', 'v', 'm')
  AND c.oid <> src.oid
ORDER BY n.nspname, c.relname
"#;

/// Views and materialized views whose rewrite rules reference an object
pub const RULE_DEPENDENTS: &str = r#"
SELECT DISTINCT n.nspname AS schema, c.relname AS name, c.relkind::text AS code
FROM pg_class base
JOIN pg_namespace basen ON basen.oid = base.relnamespace
JOIN pg_depend d ON d.refobjid = base.oid
JOIN pg_rewrite rw ON rw.oid = d.objid
JOIN pg_class c ON c.oid = rw.ev_class
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE basen.nspname = $1
  AND base.relname = $2
  AND d.deptype = 'n'
  AND c.relkind IN ('v', 'm')
  AND c.oid <> base.oid
ORDER BY n.nspname, c.relname
"#;

/// Every plain function and procedure in a schema, with definitions.
/// Aggregates and window pseudo-functions are excluded: pg_get_functiondef
/// raises on them.
pub const ROUTINES_IN_SCHEMA: &str = r#"
SELECT n.nspname AS schema, p.proname AS name, p.prokind::text AS code,
       pg_get_functiondef(p.oid) AS definition
FROM pg_proc p
JOIN pg_namespace n ON n.oid = p.pronamespace
WHERE n.nspname = $1 AND p.prokind IN ('f', 'p')
ORDER BY p.proname
"#;

/// Every view and materialized view in a schema, with definitions
pub const VIEWS_IN_SCHEMA: &str = r#"
SELECT n.nspname AS schema, c.relname AS name, c.relkind::text AS code,
       pg_get_viewdef(c.oid, true) AS definition
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relkind IN ('v', 'm')
ORDER BY c.relname
"#;

/// User-level triggers attached to a table
pub const TRIGGERS_ON_TABLE: &str = r#"
SELECT DISTINCT n.nspname AS schema, t.tgname AS name
FROM pg_trigger t
JOIN pg_class c ON c.oid = t.tgrelid
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2 AND NOT t.tgisinternal
ORDER BY t.tgname
"#;

/// User-visible schemas
pub const LIST_SCHEMAS: &str = r#"
SELECT nspname
FROM pg_namespace
WHERE nspname NOT LIKE 'pg_%' AND nspname <> 'information_schema'
ORDER BY nspname
"#;

/// Relations and routines in a schema, one row per object
pub const LIST_OBJECTS: &str = r#"
SELECT name, namespace, code FROM (
    SELECT c.relname AS name, 'relation' AS namespace, c.relkind::text AS code
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1 AND c.relkind IN ('r', 'p', 'v', 'm', 'S')
    UNION ALL
    SELECT p.proname AS name, 'routine' AS namespace, p.prokind::text AS code
    FROM pg_proc p
    JOIN pg_namespace n ON n.oid = p.pronamespace
    WHERE n.nspname = $1 AND p.prokind IN ('f', 'p')
) objects
ORDER BY name
"#;
