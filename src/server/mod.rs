use crate::catalog::Catalog;
use crate::walker::WalkOptions;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod routes;

/// State shared by every handler
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub options: WalkOptions,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/schemas", get(routes::get_schemas))
        .route("/api/objects/{schema}", get(routes::get_objects))
        .route("/api/graph/{schema}/{name}", get(routes::get_graph))
        .route("/api/ddl/{schema}/{name}", get(routes::get_ddl))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    catalog: Arc<dyn Catalog>,
    options: WalkOptions,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState { catalog, options });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("🌐 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
