//! Task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing and dev)
//! - `sqlite`: SQLite database with foreign-key cascade for comments

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TaskError;
use crate::task::{Comment, Task, TaskFilter};

/// Task store trait - implemented by all storage backends.
///
/// Filtering goes through [`TaskFilter::matches`] in every backend and
/// listing order is creation order, so backends are interchangeable.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List tasks matching the filter, in creation order.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError>;

    /// Get a single task by id.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, TaskError>;

    /// Insert a new task.
    async fn insert_task(&self, task: &Task) -> Result<(), TaskError>;

    /// Replace a stored task. Returns `false` when the id is unknown.
    /// Comments are not touched; they have their own operations.
    async fn update_task(&self, task: &Task) -> Result<bool, TaskError>;

    /// Delete a task and all of its comments. Returns `false` when the id
    /// is unknown.
    async fn delete_task(&self, id: Uuid) -> Result<bool, TaskError>;

    /// Append a comment to a task. Returns `false` when the task is unknown.
    async fn add_comment(&self, task_id: Uuid, comment: &Comment) -> Result<bool, TaskError>;

    /// Delete a single comment. `None` when the task is unknown,
    /// `Some(false)` when the comment is, `Some(true)` on success.
    async fn delete_comment(
        &self,
        task_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<bool>, TaskError>;
}

/// Task store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    Memory,
    #[default]
    Sqlite,
}

impl StoreKind {
    /// Parse from the `TASK_STORE` environment variable value.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create a task store based on kind and data directory.
pub async fn create_task_store(
    kind: StoreKind,
    data_dir: PathBuf,
) -> Result<Arc<dyn TaskStore>, TaskError> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
        StoreKind::Sqlite => {
            let store = SqliteTaskStore::new(data_dir).await?;
            Ok(Arc::new(store))
        }
    }
}
