use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::fields::{
    blank_date_as_none, blank_string_as_none, not_blank, nullable_date, nullable_id,
    nullable_string, optional_id,
};

/// Priority of a task. Stored and serialized as `baja`, `media`, `alta`.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type,
)]
pub enum TaskPriority {
    #[serde(rename = "baja")]
    #[sqlx(rename = "baja")]
    Low,
    #[default]
    #[serde(rename = "media")]
    #[sqlx(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    #[sqlx(rename = "alta")]
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "baja",
            TaskPriority::Medium => "media",
            TaskPriority::High => "alta",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    /// Accepts the stored names and their English equivalents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baja" | "low" => Ok(TaskPriority::Low),
            "media" | "medium" => Ok(TaskPriority::Medium),
            "alta" | "high" => Ok(TaskPriority::High),
            other => Err(format!("Invalid priority: {}", other)),
        }
    }
}

/// A task row as returned by the API.
///
/// `list_name` is filled when the query joins `task_lists`. `user_id` is
/// read from the database for ownership checks but never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub completed: bool,
    pub list_id: Option<i64>,
    #[serde(default)]
    #[sqlx(default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    #[sqlx(default)]
    pub user_id: i64,
}

/// Payload for `POST /api/tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[serde(default)]
    #[validate(custom = "not_blank", length(max = 200))]
    pub title: String,

    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "blank_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub list_id: Option<i64>,
}

/// Payload for `PUT /api/tasks/{id}`.
///
/// Every field is optional: absent fields keep their stored value. For the
/// nullable columns the inner `Option` tells "set" (`Some(Some(v))`) apart
/// from "clear" (`Some(None)`, sent as JSON `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "not_blank", length(max = 200))]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "nullable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(
        default,
        deserialize_with = "nullable_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub list_id: Option<Option<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to an in-memory task, the same way the server
    /// applies it to the stored row.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(list_id) = self.list_id {
            task.list_id = list_id;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Aggregate counters for `GET /api/tasks/stats` and list stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub high_priority_pending: i64,
}
