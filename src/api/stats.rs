//! Dashboard statistics endpoints.
//!
//! Each endpoint is independent and side-effect free; the dashboard
//! fetches all four in parallel.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::routes::AppState;
use super::task_error;
use crate::stats::{
    self, DailyCompletions, ProductivitySummary, StatusCounts, TagCount, DEFAULT_WINDOW_DAYS,
    TOP_TAGS,
};
use crate::task::{Task, TaskFilter};

/// Create statistics routes, mounted under `/tarefas`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(status_counts))
        .route("/tags", get(tag_frequency))
        .route("/concluidas", get(daily_completions))
        .route("/produtividade", get(productivity))
}

/// Optional user scope: tasks the user created or collaborates on.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub usuario: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletionsQuery {
    pub usuario: Option<String>,
    /// Trailing window in days, clamped to 1..=90. Defaults to 7.
    pub dias: Option<i64>,
}

async fn scoped_tasks(
    state: &AppState,
    user: Option<&str>,
) -> Result<Vec<Task>, (StatusCode, String)> {
    let tasks = state
        .service
        .list_tasks(&TaskFilter::default())
        .await
        .map_err(task_error)?;
    Ok(stats::scope_to_user(tasks, user))
}

/// GET /tarefas/status - Task counts per status.
async fn status_counts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<StatusCounts>, (StatusCode, String)> {
    let tasks = scoped_tasks(&state, query.usuario.as_deref()).await?;
    Ok(Json(stats::status_counts(&tasks)))
}

/// GET /tarefas/tags - Top-5 tags by occurrence count.
async fn tag_frequency(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<TagCount>>, (StatusCode, String)> {
    let tasks = scoped_tasks(&state, query.usuario.as_deref()).await?;
    Ok(Json(stats::tag_frequency(&tasks, TOP_TAGS)))
}

/// GET /tarefas/concluidas - Completion counts per day, oldest first.
async fn daily_completions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompletionsQuery>,
) -> Result<Json<Vec<DailyCompletions>>, (StatusCode, String)> {
    let days = query.dias.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, 90);
    let tasks = scoped_tasks(&state, query.usuario.as_deref()).await?;
    Ok(Json(stats::daily_completions(&tasks, days, Utc::now())))
}

/// GET /tarefas/produtividade - Aggregate productivity summary.
async fn productivity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ProductivitySummary>, (StatusCode, String)> {
    let tasks = scoped_tasks(&state, query.usuario.as_deref()).await?;
    Ok(Json(stats::productivity(&tasks, Utc::now())))
}
