mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use turify_tasks::models::{ApiResponse, TaskList, TaskListWithTasks, TaskStats};
use turify_tasks::routes;

use common::{register_and_login, test_pool};

#[actix_rt::test]
async fn test_list_names_are_unique_per_user() {
    let pool = test_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(alice.clone())
        .set_json(json!({ "name": "Work", "description": "Office things" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: ApiResponse<TaskList> = test::read_body_json(resp).await;
    assert_eq!(created.message.as_deref(), Some("Task list created"));
    assert_eq!(created.data.task_count, 0);

    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(alice.clone())
        .set_json(json!({ "name": "Work" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Another user may reuse the name
    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(bob.clone())
        .set_json(json!({ "name": "Work" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(alice.clone())
        .set_json(json!({ "name": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Renaming onto an existing name conflicts too
    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(alice.clone())
        .set_json(json!({ "name": "Home" }))
        .to_request();
    let home: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/task-lists/{}", home.data.id))
        .cookie(alice.clone())
        .set_json(json!({ "name": "Work" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri(&format!("/api/task-lists/{}", home.data.id))
        .cookie(alice.clone())
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/task-lists/{}", home.data.id))
        .cookie(alice.clone())
        .set_json(json!({ "description": "Chores" }))
        .to_request();
    let updated: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.data.name, "Home");
    assert_eq!(updated.data.description.as_deref(), Some("Chores"));

    // Bob cannot see or touch Alice's list
    let req = test::TestRequest::get()
        .uri(&format!("/api/task-lists/{}", home.data.id))
        .cookie(bob.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
    let req = test::TestRequest::put()
        .uri(&format!("/api/task-lists/{}", home.data.id))
        .cookie(bob)
        .set_json(json!({ "name": "Mine now" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri("/api/task-lists")
        .cookie(alice)
        .to_request();
    let lists: ApiResponse<Vec<TaskList>> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(lists.data.len(), 2);
}

#[actix_rt::test]
async fn test_delete_list_cascades_to_tasks() {
    let pool = test_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;
    let cookie = register_and_login(&app, "cascade_user").await;

    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(cookie.clone())
        .set_json(json!({ "name": "Groceries" }))
        .to_request();
    let list: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;
    let list_id = list.data.id;

    for title in ["Milk", "Eggs", "Bread"] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .cookie(cookie.clone())
            .set_json(json!({ "title": title, "list_id": list_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .cookie(cookie.clone())
        .set_json(json!({ "title": "Unfiled" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/task-lists/{}", list_id))
        .cookie(cookie.clone())
        .to_request();
    let list: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.data.task_count, 3);

    let req = test::TestRequest::get()
        .uri(&format!("/api/task-lists/{}/tasks", list_id))
        .cookie(cookie.clone())
        .to_request();
    let with_tasks: ApiResponse<TaskListWithTasks> =
        test::call_and_read_body_json(&app, req).await;
    assert_eq!(with_tasks.data.list.name, "Groceries");
    assert_eq!(with_tasks.data.tasks.len(), 3);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/task-lists/{}", list_id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted_tasks"], 3);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/task-lists/{}", list_id))
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_move_tasks_and_stats() {
    let pool = test_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;
    let cookie = register_and_login(&app, "mover").await;
    let stranger = register_and_login(&app, "stranger").await;

    let mut list_ids = Vec::new();
    for name in ["From", "To"] {
        let req = test::TestRequest::post()
            .uri("/api/task-lists")
            .cookie(cookie.clone())
            .set_json(json!({ "name": name }))
            .to_request();
        let list: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;
        list_ids.push(list.data.id);
    }
    let (from, to) = (list_ids[0], list_ids[1]);

    for (title, priority) in [("One", "alta"), ("Two", "media")] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .cookie(cookie.clone())
            .set_json(json!({ "title": title, "priority": priority, "list_id": from }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/task-lists/{}/stats", from))
        .cookie(cookie.clone())
        .to_request();
    let stats: ApiResponse<TaskStats> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.data.total_tasks, 2);
    assert_eq!(stats.data.high_priority_pending, 1);

    // Target list of another user
    let req = test::TestRequest::post()
        .uri("/api/task-lists")
        .cookie(stranger)
        .set_json(json!({ "name": "Theirs" }))
        .to_request();
    let theirs: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/task-lists/{}/move-tasks", from))
        .cookie(cookie.clone())
        .set_json(json!({ "target_list_id": theirs.data.id }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/task-lists/{}/move-tasks", from))
        .cookie(cookie.clone())
        .set_json(json!({ "target_list_id": to }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["moved"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/task-lists/{}", to))
        .cookie(cookie.clone())
        .to_request();
    let list: ApiResponse<TaskList> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.data.task_count, 2);

    // And out of any list
    let req = test::TestRequest::post()
        .uri(&format!("/api/task-lists/{}/move-tasks", to))
        .cookie(cookie.clone())
        .set_json(json!({ "target_list_id": null }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["moved"], 2);

    let req = test::TestRequest::get()
        .uri("/api/tasks/orphaned")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
