//! Task service: CRUD and comment operations over the store.
//!
//! All invariant enforcement lives here: blank-title validation,
//! collaborator email shape and duplicate rejection, and the coupling
//! between status and completion timestamp. Validation and conflict
//! failures reject before any store mutation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::TaskError;
use crate::store::TaskStore;
use crate::task::{
    validate_collaborators, Comment, NewTask, Task, TaskFilter, TaskPatch,
};

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// List tasks matching the filter, in creation order.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        self.store.list_tasks(filter).await
    }

    /// Get a single task.
    pub async fn get_task(&self, id: Uuid) -> Result<Task, TaskError> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| TaskError::task_not_found(id))
    }

    /// Create a task. `titulo` must be non-blank; status defaults to
    /// pending and comments start empty.
    pub async fn create_task(&self, input: NewTask) -> Result<Task, TaskError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(TaskError::Validation("titulo must not be empty".to_string()));
        }
        validate_collaborators(&input.collaborators)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: input.description,
            status: input.status,
            creator: input.creator,
            collaborators: input.collaborators,
            tags: input.tags,
            created_at: now,
            // Creating directly in "concluida" stamps completion at creation.
            completed_at: match input.status {
                crate::task::TaskStatus::Completed => Some(now),
                _ => None,
            },
            comments: vec![],
        };

        self.store.insert_task(&task).await?;
        info!(task_id = %task.id, status = %task.status, "created task");
        Ok(task)
    }

    /// Apply a partial update. Only fields present in the patch change;
    /// a patch that changes nothing is not persisted.
    pub async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, TaskError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(TaskError::Validation("titulo must not be empty".to_string()));
            }
        }
        if let Some(collaborators) = &patch.collaborators {
            validate_collaborators(collaborators)?;
        }

        let mut task = self.get_task(id).await?;
        let mut changed = false;

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if task.title != title {
                task.title = title;
                changed = true;
            }
        }
        if let Some(description) = patch.description {
            if task.description != description {
                task.description = description;
                changed = true;
            }
        }
        if let Some(collaborators) = patch.collaborators {
            if task.collaborators != collaborators {
                task.collaborators = collaborators;
                changed = true;
            }
        }
        if let Some(tags) = patch.tags {
            if task.tags != tags {
                task.tags = tags;
                changed = true;
            }
        }
        if let Some(status) = patch.status {
            // Same-status requests are a no-op so completion is never
            // re-timestamped.
            if task.set_status(status, Utc::now()) {
                changed = true;
            }
        }

        if !changed {
            debug!(task_id = %id, "patch changed nothing, skipping persist");
            return Ok(task);
        }

        if !self.store.update_task(&task).await? {
            return Err(TaskError::task_not_found(id));
        }
        info!(task_id = %id, status = %task.status, "updated task");
        Ok(task)
    }

    /// Delete a task and its comments.
    pub async fn delete_task(&self, id: Uuid) -> Result<(), TaskError> {
        if !self.store.delete_task(id).await? {
            return Err(TaskError::task_not_found(id));
        }
        info!(task_id = %id, "deleted task");
        Ok(())
    }

    /// Append a comment. Both author and body must be non-blank.
    pub async fn add_comment(
        &self,
        task_id: Uuid,
        author: &str,
        body: &str,
    ) -> Result<Comment, TaskError> {
        if author.trim().is_empty() {
            return Err(TaskError::Validation("autor must not be empty".to_string()));
        }
        if body.trim().is_empty() {
            return Err(TaskError::Validation("texto must not be empty".to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            author: author.trim().to_string(),
            body: body.trim().to_string(),
            created_at: Utc::now(),
        };

        if !self.store.add_comment(task_id, &comment).await? {
            return Err(TaskError::task_not_found(task_id));
        }
        info!(task_id = %task_id, comment_id = %comment.id, "added comment");
        Ok(comment)
    }

    /// Delete a single comment by id; sibling order is preserved.
    pub async fn delete_comment(&self, task_id: Uuid, comment_id: Uuid) -> Result<(), TaskError> {
        match self.store.delete_comment(task_id, comment_id).await? {
            None => Err(TaskError::task_not_found(task_id)),
            Some(false) => Err(TaskError::NotFound(format!(
                "comment {} not found on task {}",
                comment_id, task_id
            ))),
            Some(true) => {
                info!(task_id = %task_id, comment_id = %comment_id, "deleted comment");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;
    use crate::task::TaskStatus;

    fn service() -> TaskService {
        TaskService::new(Arc::new(InMemoryTaskStore::new()))
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_defaults_to_pending() {
        let svc = service();
        let task = svc.create_task(new_task("estudar")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        assert!(task.comments.is_empty());
    }

    #[tokio::test]
    async fn create_blank_title_stores_nothing() {
        let svc = service();
        let err = svc.create_task(new_task("   ")).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert!(svc
            .list_tasks(&TaskFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn create_completed_stamps_completion() {
        let svc = service();
        let task = svc
            .create_task(NewTask {
                title: "já feita".to_string(),
                status: TaskStatus::Completed,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(task.completed_at.is_some());
    }

    #[tokio::test]
    async fn create_rejects_bad_collaborators() {
        let svc = service();
        let err = svc
            .create_task(NewTask {
                title: "t".to_string(),
                collaborators: vec!["notanemail".to_string()],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert!(svc
            .list_tasks(&TaskFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn status_transitions_manage_completion_timestamp() {
        let svc = service();
        let task = svc.create_task(new_task("fluxo")).await.unwrap();

        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let task = svc.update_task(task.id, patch).await.unwrap();
        assert!(task.completed_at.is_none());

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let task = svc.update_task(task.id, patch).await.unwrap();
        let stamped = task.completed_at.expect("completion stamped");

        // Same-status patch must not re-stamp.
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let task = svc.update_task(task.id, patch).await.unwrap();
        assert_eq!(task.completed_at, Some(stamped));

        let patch = TaskPatch {
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };
        let task = svc.update_task(task.id, patch).await.unwrap();
        assert!(task.completed_at.is_none());
    }

    #[tokio::test]
    async fn completion_invariant_holds_through_store() {
        let svc = service();
        let task = svc
            .create_task(NewTask {
                title: "inv".to_string(),
                status: TaskStatus::Completed,
                ..Default::default()
            })
            .await
            .unwrap();

        for t in svc.list_tasks(&TaskFilter::default()).await.unwrap() {
            assert_eq!(t.status == TaskStatus::Completed, t.completed_at.is_some());
        }

        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        svc.update_task(task.id, patch).await.unwrap();
        let stored = svc.get_task(task.id).await.unwrap();
        assert_eq!(
            stored.status == TaskStatus::Completed,
            stored.completed_at.is_some()
        );
    }

    #[tokio::test]
    async fn patch_applies_only_present_fields() {
        let svc = service();
        let task = svc
            .create_task(NewTask {
                title: "original".to_string(),
                description: "desc".to_string(),
                tags: vec!["a".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        // Absent fields stay untouched; present empty string applies.
        let patch: TaskPatch = serde_json::from_str(r#"{"descricao": ""}"#).unwrap();
        let updated = svc.update_task(task.id, patch).await.unwrap();
        assert_eq!(updated.title, "original");
        assert_eq!(updated.description, "");
        assert_eq!(updated.tags, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn patch_blank_title_rejected() {
        let svc = service();
        let task = svc.create_task(new_task("ok")).await.unwrap();
        let patch = TaskPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        let err = svc.update_task(task.id, patch).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert_eq!(svc.get_task(task.id).await.unwrap().title, "ok");
    }

    #[tokio::test]
    async fn malformed_collaborator_leaves_state_unchanged() {
        let svc = service();
        let task = svc
            .create_task(NewTask {
                title: "t".to_string(),
                collaborators: vec!["ana@example.com".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        let patch = TaskPatch {
            collaborators: Some(vec![
                "ana@example.com".to_string(),
                "notanemail".to_string(),
            ]),
            ..Default::default()
        };
        let err = svc.update_task(task.id, patch).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        let stored = svc.get_task(task.id).await.unwrap();
        assert_eq!(stored.collaborators, vec!["ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_collaborator_is_conflict() {
        let svc = service();
        let task = svc.create_task(new_task("t")).await.unwrap();
        let patch = TaskPatch {
            collaborators: Some(vec![
                "rui@example.com".to_string(),
                "rui@example.com".to_string(),
            ]),
            ..Default::default()
        };
        let err = svc.update_task(task.id, patch).await.unwrap_err();
        assert!(matches!(err, TaskError::Conflict(_)));
        assert!(svc.get_task(task.id).await.unwrap().collaborators.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_task_is_not_found() {
        let svc = service();
        let err = svc
            .update_task(Uuid::new_v4(), TaskPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_task_and_comments() {
        let svc = service();
        let task = svc.create_task(new_task("t")).await.unwrap();
        svc.add_comment(task.id, "ana", "olá").await.unwrap();

        svc.delete_task(task.id).await.unwrap();
        let err = svc.get_task(task.id).await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));

        let err = svc.delete_task(task.id).await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[tokio::test]
    async fn comment_add_then_delete_restores_prior_list() {
        let svc = service();
        let task = svc.create_task(new_task("t")).await.unwrap();
        let first = svc.add_comment(task.id, "ana", "um").await.unwrap();
        let second = svc.add_comment(task.id, "rui", "dois").await.unwrap();

        let before = svc.get_task(task.id).await.unwrap().comments;

        let third = svc.add_comment(task.id, "bia", "três").await.unwrap();
        svc.delete_comment(task.id, third.id).await.unwrap();

        let after = svc.get_task(task.id).await.unwrap().comments;
        assert_eq!(before, after);
        assert_eq!(
            after.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[tokio::test]
    async fn comment_validation_and_not_found() {
        let svc = service();
        let task = svc.create_task(new_task("t")).await.unwrap();

        let err = svc.add_comment(task.id, "", "texto").await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        let err = svc.add_comment(task.id, "ana", "  ").await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        let err = svc
            .add_comment(Uuid::new_v4(), "ana", "texto")
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));

        let err = svc
            .delete_comment(task.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }
}
