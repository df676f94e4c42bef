//! HTTP API for the Tarefas backend.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /cadastre` - Register an account
//! - `POST /auth/login` - Obtain a bearer token
//! - `GET /tarefas` - List tasks (optional query filters)
//! - `POST /tarefas` - Create a task
//! - `GET /tarefas/{id}` - Get a single task
//! - `PUT /tarefas/{id}` - Partial update
//! - `DELETE /tarefas/{id}` - Delete a task (cascades comments)
//! - `POST /tarefas/comentario` - Add a comment
//! - `DELETE /tarefas/comentario/delete` - Delete a comment
//! - `GET /tarefas/status` - Status counts
//! - `GET /tarefas/tags` - Top-5 tag frequency
//! - `GET /tarefas/concluidas` - Daily completion buckets
//! - `GET /tarefas/produtividade` - Productivity summary

mod auth;
mod routes;
mod stats;
mod tasks;
pub mod types;

pub use routes::serve;

use axum::http::StatusCode;

use crate::error::{AccountError, TaskError};

/// Map a task-service error onto the `(StatusCode, String)` handler form.
pub(crate) fn task_error(err: TaskError) -> (StatusCode, String) {
    match err {
        TaskError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        TaskError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        TaskError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        TaskError::Upstream(msg) => {
            tracing::error!("store failure: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
}

pub(crate) fn account_error(err: AccountError) -> (StatusCode, String) {
    match err {
        AccountError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        AccountError::Conflict(email) => (
            StatusCode::CONFLICT,
            format!("account already exists: {}", email),
        ),
        AccountError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
        }
        AccountError::Upstream(msg) => {
            tracing::error!("account store failure: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_errors_map_to_status_codes() {
        let (code, _) = task_error(TaskError::Validation("x".into()));
        assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);
        let (code, _) = task_error(TaskError::NotFound("x".into()));
        assert_eq!(code, StatusCode::NOT_FOUND);
        let (code, _) = task_error(TaskError::Conflict("x".into()));
        assert_eq!(code, StatusCode::CONFLICT);
        let (code, _) = task_error(TaskError::Upstream("x".into()));
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn account_errors_map_to_status_codes() {
        let (code, _) = account_error(AccountError::InvalidCredentials);
        assert_eq!(code, StatusCode::UNAUTHORIZED);
        let (code, _) = account_error(AccountError::Conflict("a@b.co".into()));
        assert_eq!(code, StatusCode::CONFLICT);
    }
}
