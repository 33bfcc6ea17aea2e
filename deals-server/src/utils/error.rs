//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 请求错误 | E0002 验证失败 |
//! | E2xxx | 权限错误 | E2001 无权限 |
//! | E3xxx | 认证错误 | E3001 未登录 |
//! | E9xxx | 系统错误 | E9003 数据库拒绝访问 |

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::db::{ACCESS_DENIED_HINT, BatchSaveError, PersistenceError};
use crate::services::ImageError;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 追踪 ID (请求 ID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401/403) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== 请求错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== 系统错误 (5xx) ==========
    /// 数据库安全规则拒绝访问 (需要人工处理)
    #[error("Database locked: {0}")]
    DatabaseLocked(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// 批量保存中途失败，之前的记录已写入
    #[error("Batch save stopped after {written} record(s) at store {failed_id}: {cause}")]
    BatchInterrupted {
        written: usize,
        failed_id: String,
        cause: PersistenceError,
    },
}

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Unified message for a rejected admin password
    pub fn invalid_credentials() -> Self {
        Self::Invalid("Invalid password".to_string())
    }

    /// 状态码、错误码、对外消息
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please login first".into()),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "E3002", "Invalid token".into()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "E3003", "Token expired".into()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.clone()),
            AppError::DatabaseLocked(msg) => {
                error!(target: "database", error = %msg, "Database access denied");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "E9003",
                    ACCESS_DENIED_HINT.to_string(),
                )
            }
            AppError::Unavailable(msg) => {
                error!(target: "database", error = %msg, "Database unavailable");
                (StatusCode::BAD_GATEWAY, "E9004", "Database unavailable".into())
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".into(),
                )
            }
            AppError::BatchInterrupted { cause, .. } => AppError::from(cause.clone()).parts(),
        }
    }

    /// 附加在错误响应 `data` 中的上下文
    fn data(&self) -> Option<serde_json::Value> {
        match self {
            AppError::BatchInterrupted {
                written, failed_id, ..
            } => Some(json!({ "written": written, "failed_id": failed_id })),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = Json(AppResponse {
            code: code.to_string(),
            message,
            data: self.data(),
            trace_id: None,
        });
        (status, body).into_response()
    }
}

impl From<PersistenceError> for AppError {
    fn from(e: PersistenceError) -> Self {
        match e {
            PersistenceError::AccessDenied(msg) => AppError::DatabaseLocked(msg),
            PersistenceError::Unavailable(msg) => AppError::Unavailable(msg),
            PersistenceError::NotFound(msg) => AppError::NotFound(msg),
            PersistenceError::Malformed(msg) => AppError::Internal(format!("Malformed document: {msg}")),
        }
    }
}

impl From<BatchSaveError> for AppError {
    fn from(e: BatchSaveError) -> Self {
        tracing::warn!(written = e.written, failed_id = %e.failed_id, "Batch save interrupted");
        AppError::BatchInterrupted {
            written: e.written,
            failed_id: e.failed_id,
            cause: e.source,
        }
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Encode(msg) => AppError::Internal(format!("Image encode failed: {msg}")),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Multipart error: {}", e))
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    ok_with_message(data, "Success")
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
        trace_id: None,
    })
}
