use chrono::NaiveDate;
use log::debug;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskPatch, TaskPriority, TaskStats};

use super::task_lists::TaskListRepository;

const TASK_SELECT: &str = "SELECT t.id, t.title, t.description, t.due_date, t.priority, \
     t.completed, t.list_id, tl.name AS list_name, t.created_at, t.updated_at, t.user_id \
     FROM tasks t LEFT JOIN task_lists tl ON t.list_id = tl.id";

pub(crate) const STATS_COLUMNS: &str = "COUNT(*) AS total_tasks, \
     COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0) AS completed_tasks, \
     COALESCE(SUM(CASE WHEN completed = 0 THEN 1 ELSE 0 END), 0) AS pending_tasks, \
     COALESCE(SUM(CASE WHEN priority = 'alta' AND completed = 0 THEN 1 ELSE 0 END), 0) AS high_priority_pending";

/// Task data access scoped to one owner. Every statement filters by
/// `user_id`, so a task of another user behaves exactly like a missing one.
pub struct TaskRepository<'a> {
    pool: &'a SqlitePool,
    owner_id: i64,
}

impl<'a> TaskRepository<'a> {
    pub fn new(pool: &'a SqlitePool, owner_id: i64) -> Self {
        Self { pool, owner_id }
    }

    /// All tasks of the owner, newest first.
    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "{} WHERE t.user_id = ? ORDER BY t.created_at DESC, t.id DESC",
            TASK_SELECT
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(self.owner_id)
            .fetch_all(self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn find(&self, id: i64) -> Result<Task, AppError> {
        let sql = format!("{} WHERE t.id = ? AND t.user_id = ?", TASK_SELECT);
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(self.owner_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    pub async fn create(&self, input: NewTask) -> Result<Task, AppError> {
        if let Some(list_id) = input.list_id {
            self.ensure_list_assignable(list_id).await?;
        }

        let result = sqlx::query(
            "INSERT INTO tasks (title, description, due_date, priority, list_id, user_id, completed) \
             VALUES (?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.due_date)
        .bind(input.priority.unwrap_or_default())
        .bind(input.list_id)
        .bind(self.owner_id)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Created task {} for user {}", id, self.owner_id);
        self.find(id).await
    }

    /// Applies a partial update and returns the re-read row.
    pub async fn update(&self, id: i64, patch: &TaskPatch) -> Result<Task, AppError> {
        let mut task = self.find(id).await?;
        if patch.is_empty() {
            return Ok(task);
        }

        if let Some(Some(list_id)) = patch.list_id {
            if task.list_id != Some(list_id) {
                self.ensure_list_assignable(list_id).await?;
            }
        }
        patch.apply_to(&mut task);

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, due_date = ?, priority = ?, list_id = ?, \
             completed = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.priority)
        .bind(task.list_id)
        .bind(task.completed)
        .bind(id)
        .bind(self.owner_id)
        .execute(self.pool)
        .await?;

        self.find(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(self.owner_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }
        Ok(())
    }

    pub async fn stats(&self) -> Result<TaskStats, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE user_id = ?", STATS_COLUMNS);
        let stats = sqlx::query_as::<_, TaskStats>(&sql)
            .bind(self.owner_id)
            .fetch_one(self.pool)
            .await?;
        Ok(stats)
    }

    pub async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "{} WHERE t.user_id = ? AND t.priority = ? ORDER BY t.created_at DESC, t.id DESC",
            TASK_SELECT
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(self.owner_id)
            .bind(priority)
            .fetch_all(self.pool)
            .await?;
        Ok(tasks)
    }

    /// Incomplete tasks due strictly before `today`, earliest first.
    pub async fn overdue(&self, today: NaiveDate) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "{} WHERE t.user_id = ? AND t.due_date IS NOT NULL AND t.due_date < ? \
             AND t.completed = 0 ORDER BY t.due_date ASC, t.id ASC",
            TASK_SELECT
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(self.owner_id)
            .bind(today)
            .fetch_all(self.pool)
            .await?;
        Ok(tasks)
    }

    /// Tasks that belong to no list.
    pub async fn orphaned(&self) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "{} WHERE t.user_id = ? AND t.list_id IS NULL ORDER BY t.created_at DESC, t.id DESC",
            TASK_SELECT
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(self.owner_id)
            .fetch_all(self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn in_list(&self, list_id: i64) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "{} WHERE t.user_id = ? AND t.list_id = ? ORDER BY t.created_at DESC, t.id DESC",
            TASK_SELECT
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(self.owner_id)
            .bind(list_id)
            .fetch_all(self.pool)
            .await?;
        Ok(tasks)
    }

    /// A task may only point at a list of the same owner.
    async fn ensure_list_assignable(&self, list_id: i64) -> Result<(), AppError> {
        let lists = TaskListRepository::new(self.pool, self.owner_id);
        if !lists.owns(list_id).await? {
            return Err(AppError::Forbidden(
                "You do not have access to this list".into(),
            ));
        }
        Ok(())
    }
}
