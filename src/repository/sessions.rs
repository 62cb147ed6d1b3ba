use chrono::{Duration, NaiveDateTime, Utc};
use log::debug;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::SessionUser;

#[derive(FromRow)]
struct SessionRow {
    expires_at: NaiveDateTime,
    id: i64,
    username: String,
    email: String,
}

/// Server-side session storage. The cookie only carries the random id.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Starts a session for `user_id` and returns its id.
    pub async fn create(&self, user_id: i64, ttl_hours: i64) -> Result<String, AppError> {
        let session_id = Uuid::new_v4().to_string();
        let expires_at = Duration::try_hours(ttl_hours)
            .and_then(|ttl| Utc::now().naive_utc().checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "Session lifetime out of range: {}h",
                    ttl_hours
                ))
            })?;

        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(session_id)
    }

    /// Resolves a session id to its user. Expired sessions are removed and
    /// reported as absent.
    pub async fn find_user(&self, session_id: &str) -> Result<Option<SessionUser>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT s.expires_at, u.id, u.username, u.email \
             FROM sessions s JOIN users u ON s.user_id = u.id WHERE s.id = ?",
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) if row.expires_at > Utc::now().naive_utc() => Ok(Some(SessionUser {
                id: row.id,
                username: row.username,
                email: row.email,
            })),
            Some(_) => {
                debug!("Session expired, removing it");
                self.destroy(session_id).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub async fn destroy(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Drops every expired session; returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().naive_utc())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
