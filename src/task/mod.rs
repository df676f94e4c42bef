//! Task domain model.
//!
//! Field names on the wire follow the JSON contract the dashboard SPA
//! already speaks (Portuguese, camelCase); the Rust side uses English
//! names with explicit serde renames.

mod filter;
mod model;
mod patch;

pub use filter::TaskFilter;
pub use model::{is_valid_email, validate_collaborators, Comment, NewTask, Task, TaskStatus};
pub use patch::TaskPatch;
