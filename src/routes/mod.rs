pub mod auth;
pub mod health;
pub mod task_lists;
pub mod tasks;

use actix_web::web;

use crate::{auth::AuthMiddleware, error::AppError};

/// Mounts every API route. The caller nests this under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(health::health)
    .service(health::ready)
    .service(health::live)
    .service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::check)
            .service(
                web::resource("/profile")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(auth::profile)),
            ),
    )
    .service(
        // Fixed paths are registered before `/{id}` so they are not shadowed.
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task_stats)
            .service(tasks::get_overdue_tasks)
            .service(tasks::get_orphaned_tasks)
            .service(tasks::get_tasks_by_priority)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/task-lists")
            .wrap(AuthMiddleware)
            .service(task_lists::get_task_lists)
            .service(task_lists::create_task_list)
            .service(task_lists::get_task_list_tasks)
            .service(task_lists::get_task_list_stats)
            .service(task_lists::move_task_list_tasks)
            .service(task_lists::get_task_list)
            .service(task_lists::update_task_list)
            .service(task_lists::delete_task_list),
    );
}
