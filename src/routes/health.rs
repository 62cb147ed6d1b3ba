use std::time::Instant;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use lazy_static::lazy_static;
use log::error;
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

lazy_static! {
    static ref STARTED_AT: Instant = Instant::now();
}

/// Forces the uptime clock to start; called once from `main`.
pub fn mark_started() {
    lazy_static::initialize(&STARTED_AT);
}

fn uptime_seconds() -> u64 {
    STARTED_AT.elapsed().as_secs()
}

fn environment(config: Option<&Config>) -> &str {
    config.map_or("development", |c| c.environment.as_str())
}

/// Health check endpoint
///
/// Pings the database and reports service metadata.
///
/// ## Responses:
/// - `200 OK`: `status` is `healthy`.
/// - `503 Service Unavailable`: the database did not answer.
#[get("/health")]
pub async fn health(
    pool: web::Data<SqlitePool>,
    config: Option<web::Data<Config>>,
) -> impl Responder {
    let started = Instant::now();

    let db_started = Instant::now();
    let db_result = db::ping(&pool).await;
    let db_ms = db_started.elapsed().as_millis() as u64;

    let (status, db_status) = match &db_result {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            error!("Health check database ping failed: {}", e);
            ("unhealthy", "disconnected")
        }
    };

    let body = json!({
        "status": status,
        "timestamp": Utc::now(),
        "response_time_ms": started.elapsed().as_millis() as u64,
        "service": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": uptime_seconds(),
            "environment": environment(config.as_ref().map(|c| c.get_ref()))
        },
        "database": {
            "status": db_status,
            "response_time_ms": db_ms,
            "type": "sqlite"
        }
    });

    if db_result.is_ok() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Readiness probe: ready once the database answers.
#[get("/health/ready")]
pub async fn ready(pool: web::Data<SqlitePool>) -> impl Responder {
    let db_ok = db::ping(&pool).await.is_ok();

    let body = json!({
        "status": if db_ok { "ready" } else { "not ready" },
        "timestamp": Utc::now(),
        "checks": {
            "database": if db_ok { "ok" } else { "failed" }
        }
    });

    if db_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Liveness probe. Never touches the database.
#[get("/health/live")]
pub async fn live() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "alive",
        "timestamp": Utc::now(),
        "uptime_seconds": uptime_seconds()
    }))
}
