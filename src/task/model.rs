//! Core task and comment types.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskError;

/// Collaborator/account email shape. Deliberately loose: anything of the
/// form `local@domain.tld` without whitespace.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Check whether a string is an acceptable collaborator/account email.
pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Validate a full collaborator list: every entry must be email-shaped and
/// the list must not contain case-sensitive duplicates.
///
/// Both failures reject the whole mutation; the caller persists nothing.
pub fn validate_collaborators(collaborators: &[String]) -> Result<(), TaskError> {
    let mut seen = std::collections::HashSet::new();
    for entry in collaborators {
        if !is_valid_email(entry) {
            return Err(TaskError::Validation(format!(
                "invalid collaborator email: {}",
                entry
            )));
        }
        if !seen.insert(entry.as_str()) {
            return Err(TaskError::Conflict(format!(
                "duplicate collaborator: {}",
                entry
            )));
        }
    }
    Ok(())
}

/// Task status. Closed set; every call site matches exhaustively.
///
/// Wire values are the ones the SPA stores and filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "concluida")]
    Completed,
}

impl TaskStatus {
    /// Stable string form, identical to the wire value. Used for SQLite
    /// columns and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pendente",
            TaskStatus::InProgress => "em_andamento",
            TaskStatus::Completed => "concluida",
        }
    }

    /// Parse the wire/column value back. Unknown values map to `Pending`,
    /// matching how the original store treated missing status.
    pub fn parse(s: &str) -> Self {
        match s {
            "em_andamento" => TaskStatus::InProgress,
            "concluida" => TaskStatus::Completed,
            _ => TaskStatus::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment attached to a task. Lifetime is bound to the owning task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Free-text author name (not a validated user identity).
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "texto")]
    pub body: String,
    #[serde(rename = "dataComentario")]
    pub created_at: DateTime<Utc>,
}

/// A unit of work with status, owner, collaborators, tags, and comments.
///
/// Invariant: `completed_at` is `Some` exactly when `status == Completed`.
/// All mutations go through [`Task::set_status`] so the coupling cannot
/// drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    pub status: TaskStatus,
    /// Identifier of the creating user. Immutable once set.
    #[serde(rename = "criador", default)]
    pub creator: String,
    /// Email-shaped collaborator identifiers, order preserved.
    #[serde(rename = "colaboradores", default)]
    pub collaborators: Vec<String>,
    /// Free-text labels, ordered, no uniqueness enforced.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "dataConclusao")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "comentarios", default)]
    pub comments: Vec<Comment>,
}

impl Task {
    /// Apply a status change, keeping `completed_at` coupled to it.
    ///
    /// Returns `false` (and changes nothing) when the requested status
    /// equals the current one, so a repeated "concluida" never
    /// re-timestamps the completion.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Completed => Some(now),
            TaskStatus::Pending | TaskStatus::InProgress => None,
        };
        true
    }
}

/// Input for task creation (`POST /tarefas` body).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(rename = "criador", default)]
    pub creator: String,
    #[serde(rename = "colaboradores", default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}
