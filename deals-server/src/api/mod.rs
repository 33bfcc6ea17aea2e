//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`catalog`] - 首页列表与标语
//! - [`stores`] - 商家详情
//! - [`admin`] - 后台接口 (登录之外均需管理员令牌)

pub mod admin;
pub mod catalog;
pub mod health;
pub mod stores;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;
use crate::middleware;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator (UUID v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no global middleware, no state)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Catalog + tagline - public routes
        .merge(catalog::router())
        // Store detail - public route
        .merge(stores::router())
        // Admin API - admin token required (except login)
        .merge(admin::router(state))
}

/// Build a fully configured application with all middleware and state
///
/// Used by both the HTTP server and in-process tests
pub fn build_app(state: ServerState) -> Router {
    build_router(&state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        // Echo the request ID on the response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Request ID - outermost, generated before logging
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
