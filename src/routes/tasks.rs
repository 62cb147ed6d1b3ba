use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Local;
use log::info;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ApiResponse, NewTask, TaskPatch, TaskPriority},
    repository::TaskRepository,
};

/// Lists every task of the session user, newest first.
///
/// ## Responses:
/// - `200 OK`: `{"success": true, "data": [Task]}`; each task carries `list_name`.
/// - `401 Unauthorized`: no live session.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = TaskRepository::new(&pool, user.id()).list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tasks)))
}

/// Creates a task for the session user.
///
/// ## Request Body:
/// - `title` (required, non-blank)
/// - `description`, `due_date` (`YYYY-MM-DD`), `priority` (`baja`|`media`|`alta`,
///   default `media`), `list_id` (optional; `0` or empty means no list)
///
/// ## Responses:
/// - `201 Created`: the stored task, `completed` is always `false`.
/// - `400 Bad Request`: blank title or malformed fields.
/// - `403 Forbidden`: `list_id` names a list the user does not own.
#[post("")]
pub async fn create_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = TaskRepository::new(&pool, user.id())
        .create(task_data.into_inner())
        .await?;
    info!("User {} created task {}", user.id(), task.id);

    Ok(HttpResponse::Created().json(ApiResponse::ok(task)))
}

#[get("/stats")]
pub async fn get_task_stats(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let stats = TaskRepository::new(&pool, user.id()).stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// Tasks with the given priority; `400` for anything but `baja`, `media`, `alta`.
#[get("/priority/{priority}")]
pub async fn get_tasks_by_priority(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    priority: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let priority: TaskPriority = priority
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid priority".into()))?;

    let tasks = TaskRepository::new(&pool, user.id())
        .by_priority(priority)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tasks)))
}

/// Incomplete tasks whose due date is before today (server local date).
#[get("/overdue")]
pub async fn get_overdue_tasks(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let today = Local::now().date_naive();
    let tasks = TaskRepository::new(&pool, user.id()).overdue(today).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tasks)))
}

#[get("/orphaned")]
pub async fn get_orphaned_tasks(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = TaskRepository::new(&pool, user.id()).orphaned().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tasks)))
}

#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = TaskRepository::new(&pool, user.id())
        .find(task_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(task)))
}

/// Partially updates a task. Fields left out of the body keep their value,
/// `null` clears `description`, `due_date` or `list_id`.
///
/// ## Responses:
/// - `200 OK`: the re-read task.
/// - `400 Bad Request`: blank title or malformed fields.
/// - `403 Forbidden`: the new `list_id` is not owned by the user.
/// - `404 Not Found`: the task does not exist or belongs to another user.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    task_id: web::Path<i64>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;

    let task = TaskRepository::new(&pool, user.id())
        .update(task_id.into_inner(), &patch)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(task)))
}

#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    TaskRepository::new(&pool, user.id()).delete(task_id).await?;
    info!("User {} deleted task {}", user.id(), task_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted"
    })))
}
