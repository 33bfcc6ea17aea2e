//! Store detail API 模块

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use crate::views::detail::{DetailView, load_detail};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stores/{id}", get(detail))
}

/// GET /api/stores/{id} - 商家详情 (记录一次点击)
async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DetailView>>> {
    let view = load_detail(&state.persistence, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Store {id} not found")))?;
    Ok(ok(view))
}
