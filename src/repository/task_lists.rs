use log::{debug, info};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{
    NewTaskList, TaskList, TaskListPatch, TaskListSummary, TaskListWithTasks, TaskStats,
};

use super::tasks::{TaskRepository, STATS_COLUMNS};

const LIST_SELECT: &str = "SELECT tl.id, tl.name, tl.description, tl.created_at, tl.updated_at, \
     (SELECT COUNT(*) FROM tasks t WHERE t.list_id = tl.id) AS task_count, \
     (SELECT COUNT(*) FROM tasks t WHERE t.list_id = tl.id AND t.completed = 1) AS completed_count \
     FROM task_lists tl";

/// Task-list data access scoped to one owner.
pub struct TaskListRepository<'a> {
    pool: &'a SqlitePool,
    owner_id: i64,
}

impl<'a> TaskListRepository<'a> {
    pub fn new(pool: &'a SqlitePool, owner_id: i64) -> Self {
        Self { pool, owner_id }
    }

    pub async fn list(&self) -> Result<Vec<TaskList>, AppError> {
        let sql = format!(
            "{} WHERE tl.user_id = ? ORDER BY tl.created_at DESC, tl.id DESC",
            LIST_SELECT
        );
        let lists = sqlx::query_as::<_, TaskList>(&sql)
            .bind(self.owner_id)
            .fetch_all(self.pool)
            .await?;
        Ok(lists)
    }

    pub async fn find(&self, id: i64) -> Result<TaskList, AppError> {
        let sql = format!("{} WHERE tl.id = ? AND tl.user_id = ?", LIST_SELECT);
        sqlx::query_as::<_, TaskList>(&sql)
            .bind(id)
            .bind(self.owner_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task list not found".into()))
    }

    pub async fn owns(&self, id: i64) -> Result<bool, AppError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM task_lists WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(self.owner_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn create(&self, input: NewTaskList) -> Result<TaskList, AppError> {
        let name = input.name.trim();
        self.ensure_name_free(name, None).await?;

        let result =
            sqlx::query("INSERT INTO task_lists (name, description, user_id) VALUES (?, ?, ?)")
                .bind(name)
                .bind(&input.description)
                .bind(self.owner_id)
                .execute(self.pool)
                .await?;

        let id = result.last_insert_rowid();
        debug!("Created task list {} for user {}", id, self.owner_id);
        self.find(id).await
    }

    pub async fn update(&self, id: i64, patch: &TaskListPatch) -> Result<TaskList, AppError> {
        let current = self.find(id).await?;

        if patch.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }

        let name = match &patch.name {
            Some(name) if name != &current.name => {
                self.ensure_name_free(name, Some(id)).await?;
                name.clone()
            }
            _ => current.name,
        };
        let description = match &patch.description {
            Some(description) => description.clone(),
            None => current.description,
        };

        sqlx::query(
            "UPDATE task_lists SET name = ?, description = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&name)
        .bind(&description)
        .bind(id)
        .bind(self.owner_id)
        .execute(self.pool)
        .await?;

        self.find(id).await
    }

    /// Deletes the list together with its tasks and returns how many tasks
    /// went with it.
    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        if !self.owns(id).await? {
            return Err(AppError::NotFound("Task list not found".into()));
        }

        let mut tx = self.pool.begin().await?;
        let deleted_tasks = sqlx::query("DELETE FROM tasks WHERE list_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM task_lists WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(self.owner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            "Deleted task list {} of user {} with {} task(s)",
            id, self.owner_id, deleted_tasks
        );
        Ok(deleted_tasks)
    }

    pub async fn with_tasks(&self, id: i64) -> Result<TaskListWithTasks, AppError> {
        let list = self.find(id).await?;
        let tasks = TaskRepository::new(self.pool, self.owner_id)
            .in_list(id)
            .await?;
        Ok(TaskListWithTasks {
            list: TaskListSummary {
                id: list.id,
                name: list.name,
            },
            tasks,
        })
    }

    pub async fn stats(&self, id: i64) -> Result<TaskStats, AppError> {
        if !self.owns(id).await? {
            return Err(AppError::NotFound("Task list not found".into()));
        }
        let sql = format!(
            "SELECT {} FROM tasks WHERE list_id = ? AND user_id = ?",
            STATS_COLUMNS
        );
        let stats = sqlx::query_as::<_, TaskStats>(&sql)
            .bind(id)
            .bind(self.owner_id)
            .fetch_one(self.pool)
            .await?;
        Ok(stats)
    }

    /// Moves every task of list `from` into `to` (or out of any list when
    /// `to` is `None`). Returns the number of tasks moved.
    pub async fn move_tasks(&self, from: i64, to: Option<i64>) -> Result<u64, AppError> {
        if !self.owns(from).await? {
            return Err(AppError::NotFound("Task list not found".into()));
        }
        if let Some(target) = to {
            if !self.owns(target).await? {
                return Err(AppError::Forbidden(
                    "You do not have access to the target list".into(),
                ));
            }
        }

        let moved = sqlx::query(
            "UPDATE tasks SET list_id = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE list_id = ? AND user_id = ?",
        )
        .bind(to)
        .bind(from)
        .bind(self.owner_id)
        .execute(self.pool)
        .await?
        .rows_affected();

        Ok(moved)
    }

    async fn ensure_name_free(&self, name: &str, except_id: Option<i64>) -> Result<(), AppError> {
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM task_lists WHERE name = ? AND user_id = ? AND id != ?",
        )
        .bind(name)
        .bind(self.owner_id)
        .bind(except_id.unwrap_or(0))
        .fetch_optional(self.pool)
        .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "You already have a list with this name".into(),
            ));
        }
        Ok(())
    }
}
