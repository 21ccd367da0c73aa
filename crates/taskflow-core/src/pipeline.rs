//! Filter-sort pipeline that derives the visible task list.
//!
//! [`visible_tasks`] is a pure function of the loaded tasks and a
//! [`ViewQuery`]. Steps, in order:
//!
//! 1. **Search**: case-insensitive substring match on title or description.
//!    Skipped when the query is blank.
//! 2. **Status**: exact match, skipped for [`StatusFilter::All`].
//! 3. **Sort**: stable, by the selected [`SortKey`].
//!
//! The list is small enough that the whole pipeline re-runs on every input
//! change; nothing is memoized.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::types::{Task, TaskStatus};

/// Status dropdown selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// No status filtering.
    #[default]
    All,
    /// Only tasks with this status.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Whether a task passes the filter.
    pub fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => task.status == status,
        }
    }

    /// Wire string (`all` or a status).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse::<TaskStatus>()
            .map(Self::Only)
            .map_err(|_| ParseError::unknown("status filter", s))
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sort dropdown selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Newest first.
    #[default]
    #[serde(rename = "created")]
    Created,
    /// Title, case-insensitive A→Z.
    #[serde(rename = "title")]
    Title,
    /// High → medium → low.
    #[serde(rename = "priority")]
    Priority,
    /// Earliest due date first; undated tasks last.
    #[serde(rename = "dueDate")]
    DueDate,
}

impl SortKey {
    /// Wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Title => "title",
            Self::Priority => "priority",
            Self::DueDate => "dueDate",
        }
    }

    /// Comparator for this key. Ties compare equal so a stable sort keeps
    /// the original relative order.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Created => b.created_at.cmp(&a.created_at),
            Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::Priority => b.priority.rank().cmp(&a.priority.rank()),
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "title" => Ok(Self::Title),
            "priority" => Ok(Self::Priority),
            "dueDate" => Ok(Self::DueDate),
            other => Err(ParseError::unknown("sort key", other)),
        }
    }
}

/// Inputs of the pipeline besides the task list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Search text as typed.
    pub search: String,
    /// Status filter.
    pub status: StatusFilter,
    /// Sort order.
    pub sort: SortKey,
}

impl ViewQuery {
    /// Whether the search box holds anything besides whitespace.
    pub fn has_search(&self) -> bool {
        !self.search.trim().is_empty()
    }
}

/// Derive the ordered visible list.
pub fn visible_tasks(tasks: &[Task], query: &ViewQuery) -> Vec<Task> {
    let needle = query
        .has_search()
        .then(|| query.search.to_lowercase());

    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| needle.as_deref().is_none_or(|n| task.matches_lowercase(n)))
        .filter(|task| query.status.admits(task))
        .cloned()
        .collect();

    visible.sort_by(|a, b| query.sort.compare(a, b));
    visible
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CategoryId, TaskId};
    use crate::types::TaskPriority;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn task(id: u64, title: &str) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.to_owned(),
            description: String::new(),
            category_id: CategoryId::new(1),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            due_date: None,
            created_at: base_time() + Duration::minutes(i64::try_from(id).unwrap()),
            completed_at: None,
            archived: false,
            demo_user_id: None,
            created_by: None,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id.get()).collect()
    }

    #[test]
    fn default_sort_is_newest_first() {
        let tasks = vec![task(1, "a"), task(2, "b"), task(3, "c")];
        let out = visible_tasks(&tasks, &ViewQuery::default());
        assert_eq!(ids(&out), vec![3, 2, 1]);
    }

    #[test]
    fn blank_query_returns_everything() {
        let tasks = vec![task(1, "a"), task(2, "b")];
        let query = ViewQuery {
            search: "   ".into(),
            ..Default::default()
        };
        assert_eq!(visible_tasks(&tasks, &query).len(), 2);
    }

    #[test]
    fn empty_query_returns_status_and_sort_applied_list() {
        let mut done = task(2, "b");
        done.status = TaskStatus::Completed;
        let tasks = vec![task(1, "a"), done, task(3, "c")];
        let query = ViewQuery {
            search: String::new(),
            status: StatusFilter::Only(TaskStatus::Pending),
            sort: SortKey::Title,
        };
        assert_eq!(ids(&visible_tasks(&tasks, &query)), vec![1, 3]);
    }

    #[test]
    fn nonmatching_query_is_empty() {
        let tasks = vec![task(1, "Groceries"), task(2, "Taxes")];
        let query = ViewQuery {
            search: "nomatch12345".into(),
            ..Default::default()
        };
        assert!(visible_tasks(&tasks, &query).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_description() {
        let mut t = task(1, "Errand");
        t.description = "Pick up DRY cleaning".into();
        let tasks = vec![t, task(2, "Other")];
        let query = ViewQuery {
            search: "dry".into(),
            ..Default::default()
        };
        assert_eq!(ids(&visible_tasks(&tasks, &query)), vec![1]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let tasks = vec![task(1, "banana"), task(2, "Apple"), task(3, "cherry")];
        let query = ViewQuery {
            sort: SortKey::Title,
            ..Default::default()
        };
        assert_eq!(ids(&visible_tasks(&tasks, &query)), vec![2, 1, 3]);
    }

    #[test]
    fn due_date_sort_puts_undated_last() {
        let mut a = task(1, "a");
        let b = task(2, "b");
        let mut c = task(3, "c");
        a.due_date = NaiveDate::from_ymd_opt(2026, 2, 10);
        c.due_date = NaiveDate::from_ymd_opt(2026, 2, 1);
        let tasks = vec![a, b, c];
        let query = ViewQuery {
            sort: SortKey::DueDate,
            ..Default::default()
        };
        assert_eq!(ids(&visible_tasks(&tasks, &query)), vec![3, 1, 2]);
    }

    #[test]
    fn parse_and_display_round_trip() {
        for key in ["created", "title", "priority", "dueDate"] {
            assert_eq!(key.parse::<SortKey>().unwrap().to_string(), key);
        }
        for filter in ["all", "pending", "in-progress", "completed"] {
            assert_eq!(filter.parse::<StatusFilter>().unwrap().to_string(), filter);
        }
        assert!("archived".parse::<StatusFilter>().is_err());
        assert!("due".parse::<SortKey>().is_err());
    }

    #[test]
    fn status_filter_serde() {
        let json = serde_json::to_string(&StatusFilter::Only(TaskStatus::InProgress)).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: StatusFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(back, StatusFilter::All);
    }

    fn arb_priority() -> impl Strategy<Value = TaskPriority> {
        prop_oneof![
            Just(TaskPriority::Low),
            Just(TaskPriority::Medium),
            Just(TaskPriority::High),
        ]
    }

    proptest! {
        #[test]
        fn priority_sort_is_ordered_and_stable(priorities in prop::collection::vec(arb_priority(), 0..40)) {
            let tasks: Vec<Task> = priorities
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let mut t = task(i as u64 + 1, "t");
                    t.priority = *p;
                    t
                })
                .collect();
            let query = ViewQuery { sort: SortKey::Priority, ..Default::default() };
            let out = visible_tasks(&tasks, &query);

            prop_assert_eq!(out.len(), tasks.len());
            for pair in out.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.priority.rank() >= b.priority.rank());
                if a.priority == b.priority {
                    prop_assert!(a.id < b.id, "ties keep input order");
                }
            }
        }

        #[test]
        fn undated_tasks_sort_after_dated(days in prop::collection::vec(prop::option::of(0u32..365), 0..40)) {
            let tasks: Vec<Task> = days
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let mut t = task(i as u64 + 1, "t");
                    t.due_date = d.and_then(|d| NaiveDate::from_yo_opt(2026, d + 1));
                    t
                })
                .collect();
            let query = ViewQuery { sort: SortKey::DueDate, ..Default::default() };
            let out = visible_tasks(&tasks, &query);

            let first_undated = out.iter().position(|t| t.due_date.is_none()).unwrap_or(out.len());
            prop_assert!(out[first_undated..].iter().all(|t| t.due_date.is_none()));
            for pair in out[..first_undated].windows(2) {
                prop_assert!(pair[0].due_date <= pair[1].due_date);
            }
        }
    }
}
