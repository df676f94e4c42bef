//! Task CRUD and comment endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::routes::AppState;
use super::task_error;
use crate::task::{Comment, NewTask, Task, TaskFilter, TaskPatch};

/// Create task routes, mounted under `/tarefas`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/comentario", post(add_comment))
        .route("/comentario/delete", delete(delete_comment))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(rename = "taskId")]
    pub task_id: Uuid,
    pub autor: String,
    pub texto: String,
}

/// Comment deletion is bound to query parameters: DELETE bodies are
/// dropped by some proxies and clients.
#[derive(Debug, Deserialize)]
pub struct DeleteCommentQuery {
    #[serde(rename = "taskId")]
    pub task_id: Uuid,
    #[serde(rename = "comentarioId")]
    pub comment_id: Uuid,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /tarefas - List tasks matching the optional query filters.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state
        .service
        .list_tasks(&filter)
        .await
        .map_err(task_error)?;
    Ok(Json(tasks))
}

/// POST /tarefas - Create a task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTask>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .service
        .create_task(input)
        .await
        .map_err(task_error)?;
    Ok(Json(task))
}

/// GET /tarefas/:id - Get a single task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state.service.get_task(id).await.map_err(task_error)?;
    Ok(Json(task))
}

/// PUT /tarefas/:id - Apply a partial update.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .service
        .update_task(id, patch)
        .await
        .map_err(task_error)?;
    Ok(Json(task))
}

/// DELETE /tarefas/:id - Delete a task and its comments.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.service.delete_task(id).await.map_err(task_error)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /tarefas/comentario - Append a comment to a task.
async fn add_comment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCommentRequest>,
) -> Result<Json<Comment>, (StatusCode, String)> {
    let comment = state
        .service
        .add_comment(req.task_id, &req.autor, &req.texto)
        .await
        .map_err(task_error)?;
    Ok(Json(comment))
}

/// DELETE /tarefas/comentario/delete - Delete a comment by id.
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteCommentQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .service
        .delete_comment(query.task_id, query.comment_id)
        .await
        .map_err(task_error)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
