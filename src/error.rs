//! 统一错误模型
//!
//! 处理器只返回 [`AppError`]；转换为 HTTP 响应时统一决定状态码、
//! 对外消息和日志级别。内部细节只进日志，不进响应体。

use crate::auth::AuthError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 请求格式或字段校验失败
    #[error("Validation error: {0}")]
    Validation(String),

    /// 唯一字段冲突
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的消息。5xx 只给固定摘要
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Auth(e) => e.to_string(),
            AppError::NotFound(what) => format!("Resource not found: {}", what),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(what.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        AppError::Conflict(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }

    fn log(&self, request_id: &str) {
        let code = self.code();
        if self.status_code().is_server_error() {
            tracing::error!(code, request_id, error = %self, "Request failed with server error");
        } else {
            tracing::warn!(code, request_id, error = %self, "Request rejected");
        }
    }
}

/// 错误响应体：`{"error": {"code", "message", "request_id"}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    /// 用于在日志中定位这次失败
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 与响应头 x-request-id 相同，便于按响应体定位日志
        let request_id = crate::middleware::current_request_id();
        self.log(&request_id);

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// 字段错误拼成一行，例如 `email: email must be a valid address`
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value ({})", field, e.code),
                })
            })
            .collect();
        fields.sort();

        AppError::Validation(format!("Validation failed: {}", fields.join("; ")))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Auth(AuthError::MissingToken).code(), 401);
        assert_eq!(AppError::not_found("contact").code(), 404);
        assert_eq!(AppError::Validation("bad".to_string()).code(), 400);
        assert_eq!(AppError::conflict("dup").code(), 409);
        assert_eq!(AppError::internal_error("boom").code(), 500);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.user_message(), "Database error occurred");

        let error = AppError::Internal("argon2 params exploded".to_string());
        assert_eq!(error.user_message(), "Internal server error");
    }

    #[test]
    fn test_validation_errors_name_fields() {
        let form = Form {
            name: "ab".to_string(),
            email: "nope".to_string(),
        };
        let error = AppError::from(form.validate().unwrap_err());

        let message = error.user_message();
        assert!(message.contains("name: too short"));
        assert!(message.contains("email: invalid value (email)"));
    }
}
