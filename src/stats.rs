//! Statistics aggregation for the dashboard.
//!
//! Pure functions over the task collection; endpoints pass `Utc::now()`
//! so the window arithmetic stays testable. Empty input always yields
//! zeroed/empty results, never an error.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::task::{Task, TaskStatus};

/// Trailing window, in days, for daily completions and the weekly rate.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// How many tags the `/tarefas/tags` endpoint returns.
pub const TOP_TAGS: usize = 5;

/// Tasks per status. All three keys are always present on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "pendente")]
    pub pending: u64,
    #[serde(rename = "em_andamento")]
    pub in_progress: u64,
    #[serde(rename = "concluida")]
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    #[serde(rename = "quantidade")]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCompletions {
    /// ISO `YYYY-MM-DD`, UTC calendar day.
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "quantidade")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductivitySummary {
    #[serde(rename = "totalTarefas")]
    pub total_tasks: u64,
    #[serde(rename = "totalComentarios")]
    pub total_comments: u64,
    #[serde(rename = "tagsDistintas")]
    pub distinct_tags: u64,
    #[serde(rename = "criadasHoje")]
    pub created_today: u64,
    /// Percentage of the scoped tasks completed within the trailing
    /// 7 days. 0.0 when the scope is empty.
    #[serde(rename = "taxaConclusaoSemanal")]
    pub weekly_completion_rate: f64,
}

/// Restrict tasks to a user's board: tasks they created plus tasks they
/// collaborate on. `None` keeps everything.
pub fn scope_to_user(tasks: Vec<Task>, user: Option<&str>) -> Vec<Task> {
    match user {
        None => tasks,
        Some(user) => tasks
            .into_iter()
            .filter(|t| t.creator == user || t.collaborators.iter().any(|c| c == user))
            .collect(),
    }
}

pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
        }
    }
    counts
}

/// Tag occurrence counts across all tasks, top `n` by descending count.
/// Ties keep first-encountered order (stable sort over encounter order).
pub fn tag_frequency(tasks: &[Task], n: usize) -> Vec<TagCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for task in tasks {
        for tag in &task.tags {
            let entry = counts.entry(tag.as_str()).or_insert(0);
            if *entry == 0 {
                order.push(tag.as_str());
            }
            *entry += 1;
        }
    }
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(n)
        .map(|tag| TagCount {
            tag: tag.to_string(),
            count: counts[tag],
        })
        .collect()
}

/// Completion counts per UTC calendar day over a trailing window ending
/// today. One zero-filled bucket per day, oldest first.
pub fn daily_completions(tasks: &[Task], days: i64, now: DateTime<Utc>) -> Vec<DailyCompletions> {
    let days = days.max(1);
    let today = now.date_naive();
    let start = today - Duration::days(days - 1);

    let mut buckets: Vec<DailyCompletions> = (0..days)
        .map(|offset| DailyCompletions {
            date: (start + Duration::days(offset)).format("%Y-%m-%d").to_string(),
            count: 0,
        })
        .collect();

    for task in tasks {
        if let Some(completed_at) = task.completed_at {
            let day = completed_at.date_naive();
            if day >= start && day <= today {
                let idx = (day - start).num_days() as usize;
                buckets[idx].count += 1;
            }
        }
    }
    buckets
}

pub fn productivity(tasks: &[Task], now: DateTime<Utc>) -> ProductivitySummary {
    let today = now.date_naive();
    let week_start = now - Duration::days(DEFAULT_WINDOW_DAYS);

    let total_tasks = tasks.len() as u64;
    let total_comments = tasks.iter().map(|t| t.comments.len() as u64).sum();
    let distinct_tags = tasks
        .iter()
        .flat_map(|t| t.tags.iter())
        .collect::<HashSet<_>>()
        .len() as u64;
    let created_today = tasks
        .iter()
        .filter(|t| t.created_at.date_naive() == today)
        .count() as u64;
    let completed_this_week = tasks
        .iter()
        .filter(|t| t.completed_at.map(|c| c > week_start).unwrap_or(false))
        .count() as u64;

    // Share of the board completed this week, so the rate stays consistent
    // with the total shown next to it on the dashboard.
    let weekly_completion_rate = if total_tasks == 0 {
        0.0
    } else {
        completed_this_week as f64 / total_tasks as f64 * 100.0
    };

    ProductivitySummary {
        total_tasks,
        total_comments,
        distinct_tags,
        created_today,
        weekly_completion_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn task_with_tags(tags: &[&str]) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            creator: "ana@example.com".to_string(),
            collaborators: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc::now(),
            completed_at: None,
            comments: vec![],
        }
    }

    #[test]
    fn empty_collection_yields_zeroes_everywhere() {
        let now = Utc::now();
        assert_eq!(status_counts(&[]), StatusCounts::default());
        assert!(tag_frequency(&[], TOP_TAGS).is_empty());

        let buckets = daily_completions(&[], DEFAULT_WINDOW_DAYS, now);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.count == 0));

        let summary = productivity(&[], now);
        assert_eq!(summary, ProductivitySummary::default());
        assert_eq!(summary.weekly_completion_rate, 0.0);
    }

    #[test]
    fn counts_by_status() {
        let mut a = task_with_tags(&[]);
        a.set_status(TaskStatus::Completed, Utc::now());
        let mut b = task_with_tags(&[]);
        b.set_status(TaskStatus::InProgress, Utc::now());
        let c = task_with_tags(&[]);

        let counts = status_counts(&[a, b, c]);
        assert_eq!(
            counts,
            StatusCounts {
                pending: 1,
                in_progress: 1,
                completed: 1,
            }
        );
    }

    #[test]
    fn tag_frequency_counts_and_tie_break() {
        let tasks = vec![
            task_with_tags(&["a", "b"]),
            task_with_tags(&["a"]),
            task_with_tags(&["c"]),
        ];

        let all = tag_frequency(&tasks, TOP_TAGS);
        assert_eq!(
            all,
            vec![
                TagCount { tag: "a".to_string(), count: 2 },
                TagCount { tag: "b".to_string(), count: 1 },
                TagCount { tag: "c".to_string(), count: 1 },
            ]
        );

        // Top-2 keeps "b" ahead of "c": first-seen order breaks the tie.
        let top = tag_frequency(&tasks, 2);
        assert_eq!(top[0].tag, "a");
        assert_eq!(top[1].tag, "b");
    }

    #[test]
    fn tags_are_case_sensitive() {
        let tasks = vec![task_with_tags(&["Casa", "casa"])];
        let counts = tag_frequency(&tasks, TOP_TAGS);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn daily_completions_buckets_by_utc_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();

        let mut yesterday = task_with_tags(&[]);
        yesterday.set_status(
            TaskStatus::Completed,
            Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 0).unwrap(),
        );
        let mut today = task_with_tags(&[]);
        today.set_status(
            TaskStatus::Completed,
            Utc.with_ymd_and_hms(2025, 3, 10, 0, 1, 0).unwrap(),
        );
        let mut too_old = task_with_tags(&[]);
        too_old.set_status(
            TaskStatus::Completed,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        );

        let buckets = daily_completions(&[yesterday, today, too_old], 7, now);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].date, "2025-03-04");
        assert_eq!(buckets[6].date, "2025-03-10");
        assert_eq!(buckets[5].count, 1); // 2025-03-09
        assert_eq!(buckets[6].count, 1); // 2025-03-10
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 2);
    }

    #[test]
    fn productivity_summary_fields() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();

        let mut completed = task_with_tags(&["a", "b"]);
        completed.created_at = now - Duration::days(3);
        completed.set_status(TaskStatus::Completed, now - Duration::days(1));
        completed.comments.push(crate::task::Comment {
            id: Uuid::new_v4(),
            author: "ana".to_string(),
            body: "feito".to_string(),
            created_at: now,
        });

        let mut fresh = task_with_tags(&["a"]);
        fresh.created_at = now;

        let mut old_completed = task_with_tags(&[]);
        old_completed.created_at = now - Duration::days(30);
        old_completed.set_status(TaskStatus::Completed, now - Duration::days(20));

        let summary = productivity(&[completed, fresh, old_completed], now);
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.total_comments, 1);
        assert_eq!(summary.distinct_tags, 2);
        assert_eq!(summary.created_today, 1);
        // 1 of 3 tasks completed within the window.
        assert!((summary.weekly_completion_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn user_scope_includes_creator_and_collaborators() {
        let mut created = task_with_tags(&[]);
        created.creator = "ana@example.com".to_string();

        let mut shared = task_with_tags(&[]);
        shared.creator = "rui@example.com".to_string();
        shared.collaborators = vec!["ana@example.com".to_string()];

        let mut unrelated = task_with_tags(&[]);
        unrelated.creator = "rui@example.com".to_string();

        let tasks = vec![created, shared, unrelated];
        assert_eq!(scope_to_user(tasks.clone(), None).len(), 3);
        assert_eq!(scope_to_user(tasks, Some("ana@example.com")).len(), 2);
    }
}
