//! Tree API endpoints.
//!
//! - `GET /tree`, `GET /tree/` and `GET /tree/:parent_id` - list children
//! - `POST /node` - create a node
//! - `PUT /node/:id` - rename
//! - `DELETE /node/:id` - delete with subtree
//! - `PATCH /node/:id/move` - reparent
//! - `PATCH /node/:id/reorder` - set sibling ordering
//! - `GET /nodes` and `GET /nodes/tree` - full tree, flat or nested
//! - `GET /health`

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::Json;
use axum::routing::{get, patch, post, put};
use axum::Router;
use nodetree_core::{core_version, Node, NodeId, TreeItem};
use serde::{Deserialize, Serialize};

use crate::http_error::{HttpError, CODE_ROUTE_NOT_FOUND};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub parent_id: NodeId,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameNodeRequest {
    // Older clients send `name`.
    #[serde(alias = "name")]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    pub new_parent_id: NodeId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderNodeRequest {
    pub new_order: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNodeResponse {
    pub deleted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: core_version().to_string(),
    })
}

async fn route_not_found(method: Method, uri: Uri) -> HttpError {
    HttpError::new(
        format!("no route for {method} {}", uri.path()),
        CODE_ROUTE_NOT_FOUND,
    )
}

async fn list_top_level(State(state): State<AppState>) -> Result<Json<Vec<Node>>, HttpError> {
    let nodes = state.with_tree(|tree| tree.list_children(None)).await?;
    Ok(Json(nodes))
}

async fn list_children(
    State(state): State<AppState>,
    parent_id: Result<Path<NodeId>, PathRejection>,
) -> Result<Json<Vec<Node>>, HttpError> {
    let Path(parent_id) = parent_id?;
    let nodes = state
        .with_tree(move |tree| tree.list_children(Some(parent_id)))
        .await?;
    Ok(Json(nodes))
}

async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Node>>, HttpError> {
    let nodes = state.with_tree(|tree| tree.list_all()).await?;
    Ok(Json(nodes))
}

async fn load_tree(State(state): State<AppState>) -> Result<Json<TreeItem>, HttpError> {
    let tree = state.with_tree(|tree| tree.load_tree()).await?;
    Ok(Json(tree))
}

async fn create_node(
    State(state): State<AppState>,
    body: Result<Json<CreateNodeRequest>, JsonRejection>,
) -> Result<Json<Node>, HttpError> {
    let Json(request) = body?;
    let node = state
        .with_tree(move |tree| tree.create_node(request.parent_id, request.title))
        .await?;
    Ok(Json(node))
}

async fn rename_node(
    State(state): State<AppState>,
    id: Result<Path<NodeId>, PathRejection>,
    body: Result<Json<RenameNodeRequest>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(id) = id?;
    let Json(request) = body?;
    state
        .with_tree(move |tree| tree.rename_node(id, request.title))
        .await?;
    Ok(StatusCode::OK)
}

async fn delete_node(
    State(state): State<AppState>,
    id: Result<Path<NodeId>, PathRejection>,
) -> Result<Json<DeleteNodeResponse>, HttpError> {
    let Path(id) = id?;
    let deleted = state.with_tree(move |tree| tree.delete_node(id)).await?;
    Ok(Json(DeleteNodeResponse { deleted }))
}

async fn move_node(
    State(state): State<AppState>,
    id: Result<Path<NodeId>, PathRejection>,
    body: Result<Json<MoveNodeRequest>, JsonRejection>,
) -> Result<Json<Node>, HttpError> {
    let Path(id) = id?;
    let Json(request) = body?;
    let node = state
        .with_tree(move |tree| tree.move_node(id, request.new_parent_id))
        .await?;
    Ok(Json(node))
}

async fn reorder_node(
    State(state): State<AppState>,
    id: Result<Path<NodeId>, PathRejection>,
    body: Result<Json<ReorderNodeRequest>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(id) = id?;
    let Json(request) = body?;
    state
        .with_tree(move |tree| tree.reorder_node(id, request.new_order))
        .await?;
    Ok(StatusCode::OK)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tree", get(list_top_level))
        // Clients build `/tree/${parentId || ''}`, so the bare slash lists the top level.
        .route("/tree/", get(list_top_level))
        .route("/tree/:parent_id", get(list_children))
        .route("/node", post(create_node))
        .route("/node/:id", put(rename_node).delete(delete_node))
        .route("/node/:id/move", patch(move_node))
        .route("/node/:id/reorder", patch(reorder_node))
        .route("/nodes", get(list_all))
        .route("/nodes/tree", get(load_tree))
        .fallback(route_not_found)
        .with_state(state)
}
