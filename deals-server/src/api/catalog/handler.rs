//! Catalog API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use crate::views::catalog::{
    CatalogPage, CatalogQuery, CategoryFilter, load_catalog, open_catalog,
};

#[derive(Debug, Serialize)]
pub struct TaglineResponse {
    pub tagline: String,
}

/// GET /api/catalog?category=
///
/// 不带 `category` 为打开首页 (记录一次浏览)；带 `category` 为切换分类，不记录。
pub async fn catalog(
    State(state): State<ServerState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<AppResponse<CatalogPage>>> {
    let page = match query.category.as_deref().map(str::trim) {
        None => open_catalog(&state.persistence).await?,
        Some("") => load_catalog(&state.persistence, CategoryFilter::All).await?,
        Some(category) => {
            let filter = category
                .parse::<CategoryFilter>()
                .map_err(|e| AppError::validation(e.to_string()))?;
            load_catalog(&state.persistence, filter).await?
        }
    };
    Ok(ok(page))
}

/// GET /api/settings/tagline - 当前标语
pub async fn tagline(State(state): State<ServerState>) -> Json<AppResponse<TaglineResponse>> {
    let tagline = state.persistence.get_tagline().await.into_value();
    ok(TaglineResponse { tagline })
}
