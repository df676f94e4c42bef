//! # Tarefas API
//!
//! REST backend for a task/to-do management single-page app: tasks with
//! comments, tags, collaborators and status, plus dashboard statistics.
//!
//! ## Architecture
//!
//! ```text
//!   axum handlers (src/api)
//!        │
//!        ▼
//!   TaskService (src/service) ── invariants, validation
//!        │
//!        ▼
//!   TaskStore trait (src/store) ── memory | sqlite
//! ```
//!
//! ## Modules
//! - `task`: domain model (Task, Comment, status, patch, filter)
//! - `service`: CRUD + comment operations and invariant enforcement
//! - `stats`: pure aggregation for the dashboard
//! - `store`: pluggable persistence backends
//! - `accounts`: registration and credential verification
//! - `api`: HTTP surface

pub mod accounts;
pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod stats;
pub mod store;
pub mod task;

pub use config::Config;
pub use error::{AccountError, TaskError};
pub use service::TaskService;
