pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::fields::{blank_string_as_none, not_blank};
use crate::models::SessionUser;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use session::{removal_cookie, session_cookie, SESSION_COOKIE};

lazy_static! {
    // Letters, digits, dots, underscores and hyphens.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap();
}

/// Payload of `POST /api/auth/login`.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub email: String,
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub password: String,
}

/// Payload of `POST /api/auth/register`.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters, digits, dots, underscores or hyphens"
        )
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    /// At least 6 characters.
    #[serde(default)]
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

impl LoginRequest {
    /// Strips surrounding whitespace from the email before validation.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self
    }
}

impl RegisterRequest {
    /// Strips surrounding whitespace from the username and email before
    /// validation.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// Body returned by register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: SessionUser,
}

/// Body of `GET /api/auth/check`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let missing_password = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(missing_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            username: "test_user-123".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            ..RegisterRequest::default()
        };
        assert!(valid_register.validate().is_ok());

        let invalid_email = RegisterRequest {
            email: "testexample.com".to_string(),
            ..valid_register_with_name()
        };
        assert!(invalid_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "123".to_string(),
            ..valid_register_with_name()
        };
        assert!(short_password.validate().is_err());

        let missing_username = RegisterRequest {
            username: "".to_string(),
            ..valid_register_with_name()
        };
        assert!(missing_username.validate().is_err());

        let spaced_username = RegisterRequest {
            username: "ana maria".to_string(),
            ..valid_register_with_name()
        };
        assert!(spaced_username.validate().is_err());
    }

    #[test]
    fn test_padded_email_validates_after_normalizing() {
        let padded = RegisterRequest {
            username: " ana ".to_string(),
            email: " ana@example.com ".to_string(),
            ..valid_register_with_name()
        };
        assert!(padded.validate().is_err());

        let normalized = padded.normalized();
        assert_eq!(normalized.username, "ana");
        assert_eq!(normalized.email, "ana@example.com");
        assert!(normalized.validate().is_ok());

        let login = LoginRequest {
            email: "\tana@example.com ".to_string(),
            password: "secret1".to_string(),
        }
        .normalized();
        assert_eq!(login.email, "ana@example.com");
    }

    fn valid_register_with_name() -> RegisterRequest {
        RegisterRequest {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
        }
    }

    #[test]
    fn test_auth_status_omits_missing_user() {
        let status = AuthStatus {
            authenticated: false,
            user: None,
        };
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            serde_json::json!({ "authenticated": false })
        );
    }
}
