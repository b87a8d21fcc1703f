use crate::graph::GraphPayload;
use crate::object::ObjectDescriptor;
use crate::server::AppState;
use crate::walker::{GraphWalker, WalkOptions};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct GraphParams {
    pub depth: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct ObjectSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize)]
pub struct DdlResponse {
    pub id: String,
    pub definition: String,
}

pub async fn get_schemas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ErrorResponse>)> {
    let schemas = state.catalog.list_schemas().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(schemas))
}

pub async fn get_objects(
    State(state): State<Arc<AppState>>,
    Path(schema): Path<String>,
) -> Result<Json<Vec<ObjectSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let objects = state.catalog.list_objects(&schema).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let summaries = objects
        .into_iter()
        .map(|obj| ObjectSummary {
            name: obj.key.name,
            kind: obj.kind.as_str().to_string(),
        })
        .collect();

    Ok(Json(summaries))
}

pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path((schema, name)): Path<(String, String)>,
    Query(params): Query<GraphParams>,
) -> Result<Json<GraphPayload>, (StatusCode, Json<ErrorResponse>)> {
    let kind = state.catalog.classify(&schema, &name).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let Some(kind) = kind else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("object {}.{} not found", schema, name),
            }),
        ));
    };

    let root = ObjectDescriptor::new(schema, name, kind);
    let central = root.key.clone();

    let max_depth = params
        .depth
        .unwrap_or(state.options.max_depth)
        .min(state.options.max_depth);
    let options = WalkOptions {
        max_depth,
        node_budget: state.options.node_budget,
    };

    let walker = GraphWalker::with_options(state.catalog.as_ref(), options);
    let graph = walker.walk(root).await;

    Ok(Json(graph.payload(&central)))
}

pub async fn get_ddl(
    State(state): State<Arc<AppState>>,
    Path((schema, name)): Path<(String, String)>,
) -> Result<Json<DdlResponse>, (StatusCode, Json<ErrorResponse>)> {
    let kind = state.catalog.classify(&schema, &name).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let Some(kind) = kind else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("object {}.{} not found", schema, name),
            }),
        ));
    };

    let descriptor = ObjectDescriptor::new(schema, name, kind);
    let definition = state.catalog.definition_text(&descriptor).await;

    Ok(Json(DdlResponse {
        id: descriptor.id(),
        definition,
    }))
}
