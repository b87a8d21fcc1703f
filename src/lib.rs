//! # Schemagraph - PostgreSQL Dependency Explorer
//!
//! Catalog-driven dependency graphs for PostgreSQL schemas.
//!
//! Schemagraph provides:
//! - A typed model of database objects and the relationships between them
//! - Catalog introspection over pg_catalog with graceful degradation
//! - A regex reference extractor for view and routine bodies
//! - A bounded walker that grows an in-memory dependency graph
//! - An embedded HTTP API serving the graph wire format

pub mod catalog;
pub mod config;
pub mod extract;
pub mod graph;
pub mod key;
pub mod object;
pub mod relation;
pub mod resolver;
pub mod server;
pub mod ui;
pub mod walker;

// Re-exports for convenient access
pub use catalog::{Catalog, MemoryCatalog, PgCatalog};
pub use graph::DependencyGraph;
pub use key::ObjectKey;
pub use object::{ObjectDescriptor, ObjectKind};
pub use relation::{RelationKind, Relationship};
pub use resolver::DependencyResolver;
pub use walker::{GraphWalker, WalkOptions};

/// Result type alias for schemagraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schemagraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("Unknown object kind: {0}")]
    UnknownKind(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] sqlx::Error),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
