use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::fields::{blank_string_as_none, not_blank, nullable_string, optional_id};
use super::task::Task;

/// A named grouping of tasks, with member counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaskList {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub task_count: i64,
    #[serde(default)]
    pub completed_count: i64,
}

/// Payload for `POST /api/task-lists`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewTaskList {
    #[serde(default)]
    #[validate(custom = "not_blank", length(max = 100))]
    pub name: String,

    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Payload for `PUT /api/task-lists/{id}`. A blank name is ignored rather
/// than rejected; a `null` description clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskListPatch {
    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl TaskListPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Payload for `POST /api/task-lists/{id}/move-tasks`. A missing or zero
/// target moves the tasks out of any list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveTasksRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub target_list_id: Option<i64>,
}

/// Minimal list header returned alongside its tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaskListSummary {
    pub id: i64,
    pub name: String,
}

/// Body of `GET /api/task-lists/{id}/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListWithTasks {
    pub list: TaskListSummary,
    pub tasks: Vec<Task>,
}
