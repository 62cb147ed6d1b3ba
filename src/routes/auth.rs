use crate::{
    auth::{
        hash_password, removal_cookie, session_cookie, verify_password, AuthResponse,
        AuthStatus, AuthenticatedUser, LoginRequest, RegisterRequest, SESSION_COOKIE,
    },
    config::SessionSettings,
    error::AppError,
    models::{Profile, SessionUser},
    repository::{NewUser, SessionRepository, UserRepository},
};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

/// Register a new user
///
/// Creates the account but does not log it in.
///
/// ## Responses:
/// - `201 Created`: `{"message", "user": {id, username, email}}`.
/// - `400 Bad Request`: missing or invalid fields.
/// - `409 Conflict`: email or username already registered.
#[post("/register")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = register_data.into_inner().normalized();
    register_data.validate()?;

    let users = UserRepository::new(&pool);
    let email = register_data.email.as_str();
    let username = register_data.username.as_str();

    if users.is_taken(email, username).await? {
        return Err(AppError::Conflict(
            "Email or username already registered".into(),
        ));
    }

    let password_hash = hash_password(&register_data.password)?;
    let user = users
        .create(NewUser {
            username,
            email,
            password_hash: &password_hash,
            first_name: register_data.first_name.as_deref(),
            last_name: register_data.last_name.as_deref(),
        })
        .await?;
    info!("Registered user {} ({})", user.id, user.username);

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered".into(),
        user: SessionUser::from(&user),
    }))
}

/// Login user
///
/// Verifies the credentials, starts a server-side session and sets the
/// session cookie.
#[post("/login")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    settings: Option<web::Data<SessionSettings>>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let login_data = login_data.into_inner().normalized();
    login_data.validate()?;
    let settings = settings
        .map(|s| s.get_ref().clone())
        .unwrap_or_default();

    let user = UserRepository::new(&pool)
        .find_by_email(&login_data.email)
        .await?;

    let user = match user {
        Some(user) if verify_password(&login_data.password, &user.password_hash) => user,
        _ => {
            warn!("Failed login attempt for {}", login_data.email);
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
    };

    let session_id = SessionRepository::new(&pool)
        .create(user.id, settings.ttl_hours)
        .await?;
    info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session_id, &settings))
        .json(AuthResponse {
            message: "Logged in".into(),
            user: SessionUser::from(&user),
        }))
}

/// Logout user
///
/// Destroys the session (if any) and clears the cookie. Always succeeds.
#[post("/logout")]
pub async fn logout(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        SessionRepository::new(&pool).destroy(cookie.value()).await?;
    }

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(json!({ "message": "Logged out" })))
}

/// Reports whether the request carries a live session. Never fails with 401.
#[get("/check")]
pub async fn check(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let user = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => SessionRepository::new(&pool).find_user(cookie.value()).await?,
        None => None,
    };

    Ok(HttpResponse::Ok().json(AuthStatus {
        authenticated: user.is_some(),
        user,
    }))
}

/// Profile of the session user. Mounted behind `AuthMiddleware`.
pub async fn profile(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = UserRepository::new(&pool).find_by_id(user.id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": Profile::from(user) })))
}
