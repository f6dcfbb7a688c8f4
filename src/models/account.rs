//! Account domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account row. Never serialized directly; use [`AccountResponse`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data needed to insert an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
}

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 100, message = "email must be at most 100 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "nickname must be at most 50 characters"))]
    pub nickname: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Account response (without sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            nickname: account.nickname,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: AccountResponse,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: AccountResponse,
}

/// Current account response
#[derive(Debug, Serialize)]
pub struct CurrentAccountResponse {
    pub user: AccountResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            nickname: String::new(),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("alice", "secret1", "a@x.com").validate().is_ok());
        assert!(register("al", "secret1", "a@x.com").validate().is_err());
        assert!(register(&"a".repeat(51), "secret1", "a@x.com").validate().is_err());
        assert!(register("alice", "12345", "a@x.com").validate().is_err());
        assert!(register("alice", "secret1", "not-an-email").validate().is_err());
    }

    #[test]
    fn test_nickname_is_optional() {
        let json = r#"{"username":"alice","password":"secret1","email":"a@x.com"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.nickname, "");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_response_hides_password() {
        let now = Utc::now();
        let account = Account {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            nickname: "Al".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(AccountResponse::from(account)).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert!(json.get("deleted_at").is_none());
    }
}
