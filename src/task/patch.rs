//! Partial update payload for tasks.

use serde::Deserialize;

use super::TaskStatus;

/// Field-presence partial update (`PUT /tarefas/:id` body).
///
/// A field absent from the JSON body deserializes to `None` and leaves the
/// stored value untouched; a present field is applied even when its value
/// is empty (`"descricao": ""` empties the description). `id`, `criador`,
/// `dataCriacao`, `dataConclusao` and `comentarios` are not patchable and
/// have no representation here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    #[serde(rename = "colaboradores")]
    pub collaborators: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// True when no field is present at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.collaborators.is_none()
            && self.tags.is_none()
    }
}
