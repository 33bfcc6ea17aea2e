//! Catalog API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/catalog", get(handler::catalog))
        .route("/api/settings/tagline", get(handler::tagline))
}
