//! 认证中间件
//!
//! 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
//! 验证成功后将 [`CurrentAdmin`] 注入请求扩展 (响应扩展中同样保留一份，供请求日志使用)。
//!
//! | 错误 | HTTP 状态码 |
//! |------|------------|
//! | 无 Authorization 头 | 401 Unauthorized |
//! | 令牌过期 | 401 TokenExpired |
//! | 无效令牌 | 401 InvalidToken |
//! | 非管理员角色 | 403 Forbidden |

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentAdmin, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS 预检
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().path().to_string());
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().path().to_string()
            );
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    let admin = CurrentAdmin::from(claims);
    if !admin.is_admin() {
        security_log!(
            "WARN",
            "permission_denied",
            subject = admin.subject.clone(),
            role = admin.role.clone()
        );
        return Err(AppError::forbidden("Admin role required"));
    }

    req.extensions_mut().insert(admin.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(admin);
    Ok(response)
}
