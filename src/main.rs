//! Schemagraph CLI - explore PostgreSQL object dependencies from the terminal

use clap::{Parser, Subcommand};
use indicatif::HumanDuration;
use schemagraph::catalog::{Catalog, PgCatalog};
use schemagraph::config::{self, AppConfig, DatabaseConfig};
use schemagraph::object::ObjectDescriptor;
use schemagraph::resolver::DependencyResolver;
use schemagraph::ui::{self, Icons, Spinner, TableBuilder};
use schemagraph::walker::GraphWalker;
use schemagraph::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "schemagraph")]
#[command(version = "0.0.1")]
#[command(about = "PostgreSQL dependency explorer - catalog-driven schema graphs")]
#[command(long_about = r#"
Schemagraph reads the PostgreSQL system catalogs and builds a dependency
graph around any table, view, materialized view, function or procedure,
enabling:
  • Impact exploration (what uses this object)
  • Lineage exploration (what this object is built from)
  • A JSON wire format for graph frontends

Example usage:
  schemagraph schemas
  schemagraph objects sales
  schemagraph graph sales order_totals --depth 3
  schemagraph serve --port 5000
"#)]
struct Cli {
    /// Connection URL (overrides DATABASE_URL and the config file)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List schemas in the connected database
    Schemas,

    /// List the objects in a schema
    Objects {
        /// Schema to list
        schema: String,
    },

    /// Show what an object depends on and what uses it
    Related {
        /// Schema of the object
        schema: String,

        /// Object name
        name: String,
    },

    /// Expand the full dependency graph around an object
    Graph {
        /// Schema of the object
        schema: String,

        /// Object name
        name: String,

        /// Maximum number of discovery rings to expand
        #[arg(long)]
        depth: Option<usize>,

        /// Print the graph wire payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the definition of an object
    Ddl {
        /// Schema of the object
        schema: String,

        /// Object name
        name: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Port to bind (defaults to the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(cli).await {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Load the config file and open a catalog connection from it.
///
/// The connection URL resolves in order: `--database-url`, the
/// `DATABASE_URL` environment variable, the config file, and finally the
/// stock localhost URL.
async fn open_catalog(
    config_path: Option<PathBuf>,
    database_url: Option<String>,
) -> anyhow::Result<(PgCatalog, AppConfig)> {
    let config = config::load_config(config_path.as_deref())?;

    let url = match config::resolve_database_url(database_url.as_deref(), config.as_ref()) {
        Some(url) => url,
        None => {
            let fallback = DatabaseConfig::default().connection_url();
            ui::warn(&format!("no connection configured, trying {}", fallback));
            fallback
        }
    };

    let settings = config.unwrap_or_default();
    let catalog = PgCatalog::connect_with(&url, settings.database.pool_size).await?;
    Ok((catalog, settings))
}

async fn classify_or_fail(
    catalog: &PgCatalog,
    schema: &str,
    name: &str,
) -> anyhow::Result<ObjectDescriptor> {
    match catalog.classify(schema, name).await? {
        Some(kind) => Ok(ObjectDescriptor::new(schema, name, kind)),
        None => Err(Error::ObjectNotFound(format!("{}.{}", schema, name)).into()),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Schemas => {
            let (catalog, _) = open_catalog(cli.config, cli.database_url).await?;
            let schemas = catalog.list_schemas().await?;

            ui::header("Schemas");
            for schema in &schemas {
                println!("  {} {}", Icons::SCHEMA, schema);
            }
            println!();
            ui::info("Total", &schemas.len().to_string());
        }

        Commands::Objects { schema } => {
            let (catalog, _) = open_catalog(cli.config, cli.database_url).await?;
            let objects = catalog.list_objects(&schema).await?;

            ui::header(&format!("Objects in {}", schema));
            if objects.is_empty() {
                println!("{}", ui::dim("  none"));
            } else {
                println!("{}", ui::objects_table(&objects));
                ui::info("Total", &objects.len().to_string());
            }
        }

        Commands::Related { schema, name } => {
            let (catalog, _) = open_catalog(cli.config, cli.database_url).await?;
            let descriptor = classify_or_fail(&catalog, &schema, &name).await?;

            ui::header(&descriptor.id());
            ui::status(Icons::SEARCH, "Kind", descriptor.kind.as_str());

            let spinner = Spinner::new("Resolving relationships");
            let resolver = DependencyResolver::new(&catalog);
            let relationships = resolver.find_related(&descriptor).await;
            spinner.finish_with_message(&format!(
                "Resolved {} relationships",
                relationships.len()
            ));

            let mut depends_on = Vec::new();
            let mut used_by = Vec::new();
            for rel in &relationships {
                let (from, to) = rel.resolved_endpoints();
                if from.key == descriptor.key {
                    depends_on.push(to);
                } else {
                    used_by.push(from);
                }
            }

            ui::section("Depends on");
            if depends_on.is_empty() {
                println!("{}", ui::muted("  none"));
            }
            for obj in depends_on {
                ui::object_line(obj.kind, &obj.id());
            }

            ui::section("Used by");
            if used_by.is_empty() {
                println!("{}", ui::muted("  none"));
            }
            for obj in used_by {
                ui::object_line(obj.kind, &obj.id());
            }
        }

        Commands::Graph {
            schema,
            name,
            depth,
            json,
        } => {
            let (catalog, settings) = open_catalog(cli.config, cli.database_url).await?;
            let descriptor = classify_or_fail(&catalog, &schema, &name).await?;
            let central = descriptor.key.clone();

            let mut options = settings.traversal.walk_options();
            if let Some(depth) = depth {
                options.max_depth = depth;
            }

            let started = Instant::now();
            let spinner = Spinner::new(&format!("Expanding dependencies of {}", central.id()));
            let walker = GraphWalker::with_options(&catalog, options);
            let graph = walker.walk(descriptor).await;
            spinner.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&graph.payload(&central))?);
                return Ok(());
            }

            ui::header(&format!("Dependency graph for {}", central.id()));
            let table = ui::edges_table(&graph);
            if table.is_empty() {
                println!("{}", ui::dim("  no relationships found"));
            } else {
                println!("{}", table);
            }

            let stats = graph.stats();
            let mut summary = TableBuilder::new();
            summary.add_row("Objects", &stats.nodes.to_string());
            summary.add_row("Relationships", &stats.edges.to_string());
            for (kind, count) in &stats.by_kind {
                summary.add_row(kind.as_str(), &count.to_string());
            }
            println!("{}", summary.build());
            ui::timing(&format!("{}", HumanDuration(started.elapsed())));
        }

        Commands::Ddl { schema, name } => {
            let (catalog, _) = open_catalog(cli.config, cli.database_url).await?;
            let descriptor = classify_or_fail(&catalog, &schema, &name).await?;
            let definition = catalog.definition_text(&descriptor).await;
            println!("{}", definition);
        }

        Commands::Serve { port } => {
            let (catalog, settings) = open_catalog(cli.config, cli.database_url).await?;
            let port = port.unwrap_or(settings.server.port);

            ui::header("Schemagraph API server");
            schemagraph::server::start_server(
                port,
                Arc::new(catalog),
                settings.traversal.walk_options(),
            )
            .await?;
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            if path.exists() && force {
                ui::warn(&format!("overwriting {}", path.display()));
            }
            config::write_config(&path, &AppConfig::default(), force)?;
            ui::success(&format!("wrote starter config to {}", path.display()));
        }
    }

    Ok(())
}
