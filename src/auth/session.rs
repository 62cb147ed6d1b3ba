use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};

use crate::config::SessionSettings;

/// Name of the cookie holding the session id.
pub const SESSION_COOKIE: &str = "turify.sid";

/// Builds the cookie handed out on login.
pub fn session_cookie(session_id: &str, settings: &SessionSettings) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.cookie_secure)
        .max_age(CookieDuration::hours(settings.ttl_hours))
        .finish()
}

/// An already-expired cookie that makes the browser drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}
