//! In-memory task store (non-persistent).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TaskStore;
use crate::error::TaskError;
use crate::task::{Comment, Task, TaskFilter};

/// Tasks live in a `Vec` so listing order is creation order by
/// construction, matching the `rowid` order of the SQLite backend.
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, TaskError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_task(&self, task: &Task) -> Result<(), TaskError> {
        self.tasks.write().await.push(task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<bool, TaskError> {
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(stored) => {
                // Comments are managed by their own operations; keep the
                // stored list authoritative.
                let comments = std::mem::take(&mut stored.comments);
                *stored = task.clone();
                stored.comments = comments;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, TaskError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }

    async fn add_comment(&self, task_id: Uuid, comment: &Comment) -> Result<bool, TaskError> {
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.comments.push(comment.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_comment(
        &self,
        task_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<bool>, TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(t) => t,
            None => return Ok(None),
        };
        let before = task.comments.len();
        task.comments.retain(|c| c.id != comment_id);
        Ok(Some(task.comments.len() < before))
    }
}
