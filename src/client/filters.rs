use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskPriority};

/// The sidebar view a user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskFilter {
    #[default]
    Inbox,
    Today,
    Upcoming,
    Important,
    Overdue,
    Completed,
    List(i64),
}

impl TaskFilter {
    /// Parses a filter name. Unknown names, including `list-` followed by
    /// something that is not an id, fall back to `Inbox`.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "inbox" => TaskFilter::Inbox,
            "today" => TaskFilter::Today,
            "upcoming" => TaskFilter::Upcoming,
            "important" => TaskFilter::Important,
            "overdue" => TaskFilter::Overdue,
            "completed" => TaskFilter::Completed,
            other => other
                .strip_prefix("list-")
                .and_then(|id| id.parse().ok())
                .map(TaskFilter::List)
                .unwrap_or_default(),
        }
    }

    /// Whether `task` belongs in this view on `today`.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::Completed => task.completed,
            _ if task.completed => false,
            TaskFilter::Inbox => true,
            TaskFilter::Today => due_bucket(task, today) == Some(DueBucket::Today),
            TaskFilter::Upcoming => due_bucket(task, today) == Some(DueBucket::Upcoming),
            TaskFilter::Overdue => due_bucket(task, today) == Some(DueBucket::Overdue),
            TaskFilter::Important => task.priority == TaskPriority::High,
            TaskFilter::List(id) => task.list_id == Some(*id),
        }
    }
}

impl From<&str> for TaskFilter {
    fn from(name: &str) -> Self {
        TaskFilter::parse(name)
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskFilter::Inbox => f.write_str("inbox"),
            TaskFilter::Today => f.write_str("today"),
            TaskFilter::Upcoming => f.write_str("upcoming"),
            TaskFilter::Important => f.write_str("important"),
            TaskFilter::Overdue => f.write_str("overdue"),
            TaskFilter::Completed => f.write_str("completed"),
            TaskFilter::List(id) => write!(f, "list-{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DueBucket {
    Overdue,
    Today,
    Upcoming,
}

fn due_bucket(task: &Task, today: NaiveDate) -> Option<DueBucket> {
    let due = task.due_date?;
    Some(match due.cmp(&today) {
        std::cmp::Ordering::Less => DueBucket::Overdue,
        std::cmp::Ordering::Equal => DueBucket::Today,
        std::cmp::Ordering::Greater => DueBucket::Upcoming,
    })
}

/// Sidebar badge numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub inbox: usize,
    pub today: usize,
    pub upcoming: usize,
    pub important: usize,
    pub overdue: usize,
    pub completed: usize,
}

/// Counts every view in one pass. A completed task only counts as
/// `completed`; any other task counts as `inbox`, in at most one of the
/// due-date views, and in `important` when its priority is high.
pub fn count_tasks(tasks: &[Task], today: NaiveDate) -> TaskCounts {
    let mut counts = TaskCounts::default();

    for task in tasks {
        if task.completed {
            counts.completed += 1;
            continue;
        }

        counts.inbox += 1;
        match due_bucket(task, today) {
            Some(DueBucket::Today) => counts.today += 1,
            Some(DueBucket::Overdue) => counts.overdue += 1,
            Some(DueBucket::Upcoming) => counts.upcoming += 1,
            None => {}
        }
        if task.priority == TaskPriority::High {
            counts.important += 1;
        }
    }

    counts
}

/// Applies the view filter, then the search term over title and
/// description (case-insensitive, blank means no search), then the exact
/// priority filter. Order of `tasks` is preserved.
pub fn filter_tasks(
    tasks: &[Task],
    filter: TaskFilter,
    search: &str,
    priority: Option<TaskPriority>,
    today: NaiveDate,
) -> Vec<Task> {
    let search = search.trim().to_lowercase();

    tasks
        .iter()
        .filter(|task| filter.matches(task, today))
        .filter(|task| search.is_empty() || matches_search(task, &search))
        .filter(|task| priority.map_or(true, |p| task.priority == p))
        .cloned()
        .collect()
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_deref()
            .map_or(false, |d| d.to_lowercase().contains(needle))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: TaskPriority::Medium,
            completed: false,
            list_id: None,
            list_name: None,
            created_at: None,
            updated_at: None,
            user_id: 0,
        }
    }

    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn sample() -> Vec<Task> {
        let day = today();
        vec![
            Task {
                due_date: Some(day),
                description: Some("Semi-skimmed".into()),
                ..task(1, "Buy milk")
            },
            Task {
                due_date: day.pred_opt(),
                priority: TaskPriority::High,
                ..task(2, "Pay rent")
            },
            Task {
                due_date: day.succ_opt(),
                list_id: Some(7),
                ..task(3, "Call plumber")
            },
            Task {
                completed: true,
                due_date: Some(day),
                priority: TaskPriority::High,
                ..task(4, "File taxes")
            },
            Task {
                list_id: Some(7),
                priority: TaskPriority::Low,
                ..task(5, "Water plants")
            },
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(TaskFilter::parse("today"), TaskFilter::Today);
        assert_eq!(TaskFilter::parse("list-12"), TaskFilter::List(12));
        assert_eq!(TaskFilter::parse("list-abc"), TaskFilter::Inbox);
        assert_eq!(TaskFilter::parse("someday"), TaskFilter::Inbox);
        assert_eq!(TaskFilter::List(12).to_string(), "list-12");
        assert_eq!(TaskFilter::from("completed"), TaskFilter::Completed);
    }

    #[test]
    fn test_primary_filters() {
        let tasks = sample();
        let run = |filter| ids(&filter_tasks(&tasks, filter, "", None, today()));

        assert_eq!(run(TaskFilter::Inbox), vec![1, 2, 3, 5]);
        assert_eq!(run(TaskFilter::Today), vec![1]);
        assert_eq!(run(TaskFilter::Upcoming), vec![3]);
        assert_eq!(run(TaskFilter::Overdue), vec![2]);
        assert_eq!(run(TaskFilter::Important), vec![2]);
        assert_eq!(run(TaskFilter::Completed), vec![4]);
        assert_eq!(run(TaskFilter::List(7)), vec![3, 5]);
        assert_eq!(run(TaskFilter::List(8)), Vec::<i64>::new());
    }

    #[test]
    fn test_search_only_narrows() {
        let tasks = sample();

        let found = filter_tasks(&tasks, TaskFilter::Inbox, "  SKIMMED ", None, today());
        assert_eq!(ids(&found), vec![1]);

        let found = filter_tasks(&tasks, TaskFilter::Inbox, "   ", None, today());
        assert_eq!(ids(&found), vec![1, 2, 3, 5]);

        // Completed tasks never leak into inbox through the search.
        let found = filter_tasks(&tasks, TaskFilter::Inbox, "taxes", None, today());
        assert!(found.is_empty());
    }

    #[test]
    fn test_priority_filter() {
        let tasks = sample();
        let found = filter_tasks(
            &tasks,
            TaskFilter::List(7),
            "",
            Some(TaskPriority::Low),
            today(),
        );
        assert_eq!(ids(&found), vec![5]);
    }

    #[test]
    fn test_counts() {
        let tasks = sample();
        let counts = count_tasks(&tasks, today());

        assert_eq!(
            counts,
            TaskCounts {
                inbox: 4,
                today: 1,
                upcoming: 1,
                important: 1,
                overdue: 1,
                completed: 1,
            }
        );
        assert_eq!(counts.inbox + counts.completed, tasks.len());
    }
}
