use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::User;

const USER_SELECT: &str = "SELECT id, username, email, password_hash, first_name, last_name, \
     created_at, updated_at FROM users";

/// Fields of a user row about to be inserted.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// True when either the email or the username is already registered.
    pub async fn is_taken(&self, email: &str, username: &str) -> Result<bool, AppError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = ? OR username = ? LIMIT 1")
                .bind(email)
                .bind(username)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn create(&self, user: NewUser<'_>) -> Result<User, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, first_name, last_name) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .execute(self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid()).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        let sql = format!("{} WHERE id = ?", USER_SELECT);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("{} WHERE email = ?", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }
}
