//! Listing filter for tasks.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{Task, TaskStatus};

/// Optional filter dimensions for `GET /tarefas`. Dimensions compose with
/// AND; an empty filter matches everything.
///
/// Every store backend filters through [`TaskFilter::matches`] so the
/// semantics cannot diverge between backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// Exact match on the creating user.
    #[serde(rename = "criador")]
    pub creator: Option<String>,
    /// Case-sensitive tag membership.
    pub tag: Option<String>,
    /// Case-insensitive title substring.
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    /// Inclusive creation-date range (UTC calendar days).
    #[serde(rename = "de")]
    pub from: Option<NaiveDate>,
    #[serde(rename = "ate")]
    pub until: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(creator) = &self.creator {
            if &task.creator != creator {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !task.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if !task
                .title
                .to_lowercase()
                .contains(&title.to_lowercase())
            {
                return false;
            }
        }
        let created = task.created_at.date_naive();
        if let Some(from) = self.from {
            if created < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if created > until {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn task(title: &str, creator: &str, tags: &[&str], day: u32) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            creator: creator.to_string(),
            collaborators: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            completed_at: None,
            comments: vec![],
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = TaskFilter::default();
        assert!(filter.matches(&task("anything", "a@b.co", &["x"], 1)));
    }

    #[test]
    fn title_substring_is_case_insensitive() {
        let filter = TaskFilter {
            title: Some("RELAT".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&task("Escrever relatório", "", &[], 1)));
        assert!(!filter.matches(&task("Outra coisa", "", &[], 1)));
    }

    #[test]
    fn tag_membership_is_case_sensitive() {
        let filter = TaskFilter {
            tag: Some("urgente".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&task("t", "", &["urgente"], 1)));
        assert!(!filter.matches(&task("t", "", &["Urgente"], 1)));
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = TaskFilter {
            from: NaiveDate::from_ymd_opt(2025, 3, 5),
            until: NaiveDate::from_ymd_opt(2025, 3, 10),
            ..Default::default()
        };
        assert!(filter.matches(&task("t", "", &[], 5)));
        assert!(filter.matches(&task("t", "", &[], 10)));
        assert!(!filter.matches(&task("t", "", &[], 4)));
        assert!(!filter.matches(&task("t", "", &[], 11)));
    }

    #[test]
    fn dimensions_compose_with_and() {
        let filter = TaskFilter {
            creator: Some("a@b.co".to_string()),
            tag: Some("x".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&task("t", "a@b.co", &["x"], 1)));
        assert!(!filter.matches(&task("t", "a@b.co", &["y"], 1)));
        assert!(!filter.matches(&task("t", "c@d.co", &["x"], 1)));
    }

    #[test]
    fn status_filter() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let mut t = task("t", "", &[], 1);
        assert!(!filter.matches(&t));
        t.set_status(TaskStatus::Completed, Utc::now());
        assert!(filter.matches(&t));
    }
}
