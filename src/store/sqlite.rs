//! SQLite-based task store.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::TaskStore;
use crate::error::TaskError;
use crate::task::{Comment, Task, TaskFilter, TaskStatus};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tarefas (
    id TEXT PRIMARY KEY NOT NULL,
    titulo TEXT NOT NULL,
    descricao TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pendente',
    criador TEXT NOT NULL DEFAULT '',
    colaboradores TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    data_criacao TEXT NOT NULL,
    data_conclusao TEXT
);

CREATE INDEX IF NOT EXISTS idx_tarefas_status ON tarefas(status);
CREATE INDEX IF NOT EXISTS idx_tarefas_criador ON tarefas(criador);

CREATE TABLE IF NOT EXISTS comentarios (
    id TEXT PRIMARY KEY NOT NULL,
    tarefa_id TEXT NOT NULL,
    autor TEXT NOT NULL,
    texto TEXT NOT NULL,
    data_comentario TEXT NOT NULL,
    FOREIGN KEY (tarefa_id) REFERENCES tarefas(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comentarios_tarefa ON comentarios(tarefa_id);
"#;

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, TaskError> {
        let db_path = data_dir.join("tarefas.db");

        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| TaskError::Upstream(format!("failed to create data dir: {}", e)))?;

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| TaskError::Upstream(format!("failed to open database: {}", e)))?;

            conn.execute_batch(SCHEMA)
                .map_err(|e| TaskError::Upstream(format!("failed to run schema: {}", e)))?;

            Self::run_migrations(&conn)?;

            Ok::<_, TaskError>(conn)
        })
        .await
        .map_err(|e| TaskError::Upstream(format!("task join error: {}", e)))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run migrations for existing databases. `CREATE TABLE IF NOT EXISTS`
    /// doesn't add columns to existing tables, so schema changes are
    /// handled here, idempotently.
    fn run_migrations(conn: &Connection) -> Result<(), TaskError> {
        // Databases created before collaborator support lack the column.
        let has_collaborators: bool = conn
            .prepare("SELECT 1 FROM pragma_table_info('tarefas') WHERE name = 'colaboradores'")
            .map_err(|e| TaskError::Upstream(e.to_string()))?
            .exists([])
            .map_err(|e| TaskError::Upstream(e.to_string()))?;

        if !has_collaborators {
            tracing::info!("Running migration: adding 'colaboradores' column to tarefas");
            conn.execute(
                "ALTER TABLE tarefas ADD COLUMN colaboradores TEXT NOT NULL DEFAULT '[]'",
                [],
            )
            .map_err(|e| TaskError::Upstream(e.to_string()))?;
        }

        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_tarefas_status ON tarefas(status);
             CREATE INDEX IF NOT EXISTS idx_comentarios_tarefa ON comentarios(tarefa_id);",
        )
        .map_err(|e| TaskError::Upstream(e.to_string()))?;

        Ok(())
    }
}

fn parse_ts(idx: usize, s: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_string_list(idx: usize, s: String) -> Result<Vec<String>, rusqlite::Error> {
    serde_json::from_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

const TASK_COLUMNS: &str =
    "id, titulo, descricao, status, criador, colaboradores, tags, data_criacao, data_conclusao";

/// Map a `SELECT {TASK_COLUMNS}` row; comments are attached separately.
fn map_task_row(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let status_str: String = row.get(3)?;
    let collaborators_json: String = row.get(5)?;
    let tags_json: String = row.get(6)?;
    let created_str: String = row.get(7)?;
    let completed_str: Option<String> = row.get(8)?;

    let completed_at = match completed_str {
        Some(s) => Some(parse_ts(8, s)?),
        None => None,
    };

    Ok(Task {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        title: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::parse(&status_str),
        creator: row.get(4)?,
        collaborators: parse_string_list(5, collaborators_json)?,
        tags: parse_string_list(6, tags_json)?,
        created_at: parse_ts(7, created_str)?,
        completed_at,
        comments: vec![],
    })
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> Result<Comment, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(3)?;
    Ok(Comment {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        author: row.get(1)?,
        body: row.get(2)?,
        created_at: parse_ts(3, created_str)?,
    })
}

/// Load the comments of one task, in insertion order.
fn load_comments(conn: &Connection, task_id: &str) -> Result<Vec<Comment>, TaskError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, autor, texto, data_comentario FROM comentarios
             WHERE tarefa_id = ?1 ORDER BY rowid ASC",
        )
        .map_err(|e| TaskError::Upstream(e.to_string()))?;
    let comments = stmt
        .query_map(params![task_id], map_comment_row)
        .map_err(|e| TaskError::Upstream(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TaskError::Upstream(e.to_string()))?;
    Ok(comments)
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        let conn = self.conn.clone();
        let filter = filter.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM tarefas ORDER BY rowid ASC",
                    TASK_COLUMNS
                ))
                .map_err(|e| TaskError::Upstream(e.to_string()))?;

            let mut tasks = stmt
                .query_map([], map_task_row)
                .map_err(|e| TaskError::Upstream(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| TaskError::Upstream(e.to_string()))?;

            // Attach comments, preserving insertion order per task.
            for task in tasks.iter_mut() {
                task.comments = load_comments(&conn, &task.id.to_string())?;
            }

            Ok(tasks
                .into_iter()
                .filter(|t| filter.matches(t))
                .collect())
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, TaskError> {
        let conn = self.conn.clone();
        let id_str = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let task: Option<Task> = conn
                .query_row(
                    &format!("SELECT {} FROM tarefas WHERE id = ?1", TASK_COLUMNS),
                    params![&id_str],
                    map_task_row,
                )
                .optional()
                .map_err(|e| TaskError::Upstream(e.to_string()))?;

            match task {
                Some(mut t) => {
                    t.comments = load_comments(&conn, &id_str)?;
                    Ok(Some(t))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }

    async fn insert_task(&self, task: &Task) -> Result<(), TaskError> {
        let conn = self.conn.clone();
        let t = task.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tarefas (id, titulo, descricao, status, criador, colaboradores, tags, data_criacao, data_conclusao)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    t.id.to_string(),
                    t.title,
                    t.description,
                    t.status.as_str(),
                    t.creator,
                    serde_json::to_string(&t.collaborators)
                        .map_err(|e| TaskError::Upstream(e.to_string()))?,
                    serde_json::to_string(&t.tags)
                        .map_err(|e| TaskError::Upstream(e.to_string()))?,
                    t.created_at.to_rfc3339(),
                    t.completed_at.map(|d| d.to_rfc3339()),
                ],
            )
            .map_err(|e| TaskError::Upstream(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }

    async fn update_task(&self, task: &Task) -> Result<bool, TaskError> {
        let conn = self.conn.clone();
        let t = task.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let rows = conn
                .execute(
                    "UPDATE tarefas SET titulo = ?1, descricao = ?2, status = ?3, colaboradores = ?4, tags = ?5, data_conclusao = ?6
                     WHERE id = ?7",
                    params![
                        t.title,
                        t.description,
                        t.status.as_str(),
                        serde_json::to_string(&t.collaborators)
                            .map_err(|e| TaskError::Upstream(e.to_string()))?,
                        serde_json::to_string(&t.tags)
                            .map_err(|e| TaskError::Upstream(e.to_string()))?,
                        t.completed_at.map(|d| d.to_rfc3339()),
                        t.id.to_string(),
                    ],
                )
                .map_err(|e| TaskError::Upstream(e.to_string()))?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, TaskError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            // Comments go with the task via ON DELETE CASCADE.
            let rows = conn
                .execute("DELETE FROM tarefas WHERE id = ?1", params![id.to_string()])
                .map_err(|e| TaskError::Upstream(e.to_string()))?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }

    async fn add_comment(&self, task_id: Uuid, comment: &Comment) -> Result<bool, TaskError> {
        let conn = self.conn.clone();
        let c = comment.clone();
        let task_id_str = task_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let exists: bool = conn
                .prepare("SELECT 1 FROM tarefas WHERE id = ?1")
                .map_err(|e| TaskError::Upstream(e.to_string()))?
                .exists(params![&task_id_str])
                .map_err(|e| TaskError::Upstream(e.to_string()))?;
            if !exists {
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO comentarios (id, tarefa_id, autor, texto, data_comentario)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    c.id.to_string(),
                    task_id_str,
                    c.author,
                    c.body,
                    c.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| TaskError::Upstream(e.to_string()))?;
            Ok(true)
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }

    async fn delete_comment(
        &self,
        task_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<bool>, TaskError> {
        let conn = self.conn.clone();
        let task_id_str = task_id.to_string();
        let comment_id_str = comment_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let exists: bool = conn
                .prepare("SELECT 1 FROM tarefas WHERE id = ?1")
                .map_err(|e| TaskError::Upstream(e.to_string()))?
                .exists(params![&task_id_str])
                .map_err(|e| TaskError::Upstream(e.to_string()))?;
            if !exists {
                return Ok(None);
            }

            let rows = conn
                .execute(
                    "DELETE FROM comentarios WHERE id = ?1 AND tarefa_id = ?2",
                    params![comment_id_str, task_id_str],
                )
                .map_err(|e| TaskError::Upstream(e.to_string()))?;
            Ok(Some(rows > 0))
        })
        .await
        .map_err(|e| TaskError::Upstream(e.to_string()))?
    }
}
