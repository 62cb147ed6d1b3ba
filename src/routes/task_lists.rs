use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ApiResponse, MoveTasksRequest, NewTaskList, TaskListPatch},
    repository::TaskListRepository,
};

/// Lists the user's task lists with `task_count` and `completed_count`.
#[get("")]
pub async fn get_task_lists(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let lists = TaskListRepository::new(&pool, user.id()).list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(lists)))
}

/// Creates a list.
///
/// ## Responses:
/// - `201 Created`: the new list.
/// - `400 Bad Request`: blank name.
/// - `409 Conflict`: the user already has a list with that name.
#[post("")]
pub async fn create_task_list(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_data: web::Json<NewTaskList>,
) -> Result<impl Responder, AppError> {
    list_data.validate()?;

    let list = TaskListRepository::new(&pool, user.id())
        .create(list_data.into_inner())
        .await?;
    info!("User {} created task list {}", user.id(), list.id);

    Ok(HttpResponse::Created().json(ApiResponse::with_message(list, "Task list created")))
}

#[get("/{id}")]
pub async fn get_task_list(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let list = TaskListRepository::new(&pool, user.id())
        .find(list_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(list)))
}

/// Renames a list and/or changes its description.
///
/// ## Responses:
/// - `200 OK`: the updated list.
/// - `400 Bad Request`: nothing to update.
/// - `404 Not Found`: not the user's list.
/// - `409 Conflict`: the new name is used by another of the user's lists.
#[put("/{id}")]
pub async fn update_task_list(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_id: web::Path<i64>,
    patch: web::Json<TaskListPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;

    let list = TaskListRepository::new(&pool, user.id())
        .update(list_id.into_inner(), &patch)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(list, "Task list updated")))
}

/// Deletes a list and, with it, every task it contains.
#[delete("/{id}")]
pub async fn delete_task_list(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let deleted_tasks = TaskListRepository::new(&pool, user.id())
        .delete(list_id.into_inner())
        .await?;

    let message = if deleted_tasks > 0 {
        format!("Task list deleted along with {} task(s)", deleted_tasks)
    } else {
        "Task list deleted".to_string()
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "deleted_tasks": deleted_tasks
    })))
}

#[get("/{id}/tasks")]
pub async fn get_task_list_tasks(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let list = TaskListRepository::new(&pool, user.id())
        .with_tasks(list_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(list)))
}

#[get("/{id}/stats")]
pub async fn get_task_list_stats(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let stats = TaskListRepository::new(&pool, user.id())
        .stats(list_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// Moves all tasks of this list into `target_list_id` (or out of any list).
#[post("/{id}/move-tasks")]
pub async fn move_task_list_tasks(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    list_id: web::Path<i64>,
    body: web::Json<MoveTasksRequest>,
) -> Result<impl Responder, AppError> {
    let moved = TaskListRepository::new(&pool, user.id())
        .move_tasks(list_id.into_inner(), body.target_list_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "moved": moved
    })))
}
