//! Admin API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/admin/login | POST | 密码换取令牌 (公开) |
//! | /api/admin/dashboard | GET | 商家、统计、标语、排行 |
//! | /api/admin/stores | POST | 新建草稿 |
//! | /api/admin/stores | PUT | 批量保存 |
//! | /api/admin/stores/{id} | PUT | 校验并保存 |
//! | /api/admin/stores/{id} | DELETE | 删除 |
//! | /api/admin/stores/{id}/duplicate | POST | 复制 |
//! | /api/admin/tagline | PUT | 更新标语 |
//! | /api/admin/images | POST | 上传并规范化图片 (multipart `file`) |

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// 后台 JSON 请求体上限 (批量保存可能包含多张 data URL 图片)
const ADMIN_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// multipart 包装的额外空间
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/admin", public_routes().merge(protected_routes(state)))
}

fn public_routes() -> Router<ServerState> {
    Router::new().route("/login", post(handler::login))
}

fn protected_routes(state: &ServerState) -> Router<ServerState> {
    let upload_limit = state.normalizer.config().max_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/stores", post(handler::create_draft).put(handler::save_batch))
        .route("/stores/{id}", put(handler::save).delete(handler::delete))
        .route("/stores/{id}/duplicate", post(handler::duplicate))
        .route("/tagline", put(handler::update_tagline))
        .route(
            "/images",
            post(handler::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}
