//! Admin API Handlers

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Store, TaglineUpdate};

use crate::admin::{AdminSession, Dashboard, validate_for_save};
use crate::auth::{ADMIN_ROLE, CurrentAdmin};
use crate::core::ServerState;
use crate::security_log;
use crate::services::NormalizedImage;
use crate::utils::validation::MAX_PASSWORD_LEN;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// 令牌主体 (只有一个管理员)
const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// 过期时间 (Unix 秒)
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchSaveResponse {
    pub saved: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    /// 远端删除是否成功 (失败时本地仍视为已删除)
    pub persisted: bool,
}

#[derive(Debug, Serialize)]
pub struct TaglineResponse {
    pub tagline: String,
    pub persisted: bool,
}

/// POST /api/admin/login - 密码换取管理员令牌
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    if req.password.is_empty() || req.password.len() > MAX_PASSWORD_LEN {
        security_log!("WARN", "login_failed", reason = "invalid_length");
        return Err(AppError::invalid_credentials());
    }

    let verifier = state.clone();
    let valid = tokio::task::spawn_blocking(move || {
        verifier.admin_credentials().verify(&req.password)
    })
    .await
    .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

    if !valid {
        security_log!("WARN", "login_failed", reason = "invalid_password");
        return Err(AppError::invalid_credentials());
    }

    let (token, expires_at) = state
        .jwt_service()
        .generate_token(ADMIN_SUBJECT, ADMIN_ROLE)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    security_log!("INFO", "login_succeeded", subject = ADMIN_SUBJECT);
    tracing::info!("Admin logged in");

    Ok(ok(LoginResponse {
        token,
        token_type: "Bearer",
        expires_at,
    }))
}

/// GET /api/admin/dashboard - 解锁后台
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Dashboard>>> {
    let session = AdminSession::open(state.persistence.clone()).await?;
    Ok(ok(session.dashboard()))
}

/// POST /api/admin/stores - 新建草稿 (不写入，保存时才持久化)
pub async fn create_draft(State(state): State<ServerState>) -> Json<AppResponse<Store>> {
    let mut session = AdminSession::new(state.persistence.clone());
    ok(session.begin_create().clone())
}

/// PUT /api/admin/stores/{id} - 校验并保存
pub async fn save(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
    Json(mut store): Json<Store>,
) -> AppResult<Json<AppResponse<Store>>> {
    if store.id.is_empty() {
        store.id = id.clone();
    } else if store.id != id {
        return Err(AppError::invalid(format!(
            "Store id {} does not match path {id}",
            store.id
        )));
    }

    let mut session = AdminSession::new(state.persistence.clone());
    let saved = session.save_store(store).await?;
    tracing::info!(admin = %admin.subject, store_id = %saved.id, "Store saved by admin");
    Ok(ok(saved))
}

/// PUT /api/admin/stores - 批量保存
///
/// 全部通过校验后才开始写入；写入按顺序进行，遇到失败即停止。
pub async fn save_batch(
    State(state): State<ServerState>,
    Json(stores): Json<Vec<Store>>,
) -> AppResult<Json<AppResponse<BatchSaveResponse>>> {
    for store in &stores {
        validate_for_save(store)
            .map_err(|e| AppError::validation(format!("Store {}: {e}", store.id)))?;
    }
    let saved = state.persistence.save_stores(&stores).await?;
    Ok(ok(BatchSaveResponse { saved }))
}

/// POST /api/admin/stores/{id}/duplicate - 复制
pub async fn duplicate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Store>>> {
    let mut session = AdminSession::open(state.persistence.clone()).await?;
    if session.db_locked() {
        return Err(AppError::DatabaseLocked("store listing denied".to_string()));
    }
    let copy = session.duplicate(&id).await?;
    Ok(ok(copy))
}

/// DELETE /api/admin/stores/{id} - 删除
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Json<AppResponse<DeleteResponse>> {
    let mut session = AdminSession::new(state.persistence.clone());
    let result = session.delete(&id).await;
    ok(DeleteResponse {
        id,
        persisted: !result.is_degraded(),
    })
}

/// PUT /api/admin/tagline - 更新标语
pub async fn update_tagline(
    State(state): State<ServerState>,
    Json(update): Json<TaglineUpdate>,
) -> AppResult<Json<AppResponse<TaglineResponse>>> {
    let mut session = AdminSession::new(state.persistence.clone());
    let result = session.set_tagline(&update.tagline).await?;
    Ok(ok(TaglineResponse {
        tagline: update.tagline,
        persisted: !result.is_degraded(),
    }))
}

/// POST /api/admin/images - 规范化上传的图片，返回可直接写入 `photo` 的 data URL
pub async fn upload_image(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<NormalizedImage>>> {
    let mut data = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            data = Some(field.bytes().await?);
            break;
        }
    }

    let data = data.ok_or_else(|| {
        AppError::validation("No 'file' field found. Field name must be 'file'")
    })?;

    let image = state.normalizer.normalize_async(data.to_vec()).await?;
    tracing::info!(
        source_bytes = data.len(),
        bytes = image.bytes,
        width = image.width,
        height = image.height,
        "Image normalized"
    );
    Ok(ok(image))
}
