//! Admin Session
//!
//! 后台面板的状态：商家列表、统计、标语、数据库锁定标记和编辑器。
//! 列表只在 [`refresh`](AdminSession::refresh) 时整体重新读取，
//! 保存、删除成功后直接更新内存中的列表。

use serde::Serialize;
use shared::models::{Analytics, ClickRank, Store};

use super::{TOP_STORES, duplicate_store, new_draft, rank_by_clicks, validate_for_save};
use crate::db::{ACCESS_DENIED_HINT, DbResult, PersistenceClient, PersistenceError, Soft};
use crate::utils::validation::{MAX_TAGLINE_LEN, validate_text_len};
use crate::utils::{AppError, AppResult};

/// 后台面板数据
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stores: Vec<Store>,
    pub analytics: Analytics,
    pub tagline: String,
    pub top_stores: Vec<ClickRank>,
    /// 数据库安全规则拒绝读取
    pub db_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_hint: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    client: PersistenceClient,
    stores: Vec<Store>,
    analytics: Analytics,
    tagline: String,
    db_locked: bool,
    editing: Option<Store>,
}

impl AdminSession {
    /// 空会话 (不读取数据库)
    pub fn new(client: PersistenceClient) -> Self {
        let tagline = client.default_tagline().to_string();
        Self {
            client,
            stores: Vec::new(),
            analytics: Analytics::default(),
            tagline,
            db_locked: false,
            editing: None,
        }
    }

    /// 解锁后台：创建会话并读取全部数据
    pub async fn open(client: PersistenceClient) -> DbResult<Self> {
        let mut session = Self::new(client);
        session.refresh().await?;
        Ok(session)
    }

    /// 重新读取商家列表、统计和标语
    ///
    /// 读取列表被拒绝时设置 `db_locked` 而不是报错；其他读取失败向上传播。
    pub async fn refresh(&mut self) -> DbResult<()> {
        match self.client.list_stores().await {
            Ok(stores) => {
                self.stores = stores;
                self.db_locked = false;
            }
            Err(PersistenceError::AccessDenied(msg)) => {
                tracing::error!(error = %msg, "Store listing denied by database rules");
                self.stores.clear();
                self.db_locked = true;
            }
            Err(e) => return Err(e),
        }
        self.analytics = self.client.get_analytics().await.into_value();
        self.tagline = self.client.get_tagline().await.into_value();
        Ok(())
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn tagline(&self) -> &str {
        &self.tagline
    }

    pub fn db_locked(&self) -> bool {
        self.db_locked
    }

    pub fn top_stores(&self) -> Vec<ClickRank> {
        rank_by_clicks(&self.stores, &self.analytics, TOP_STORES)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            stores: self.stores.clone(),
            analytics: self.analytics.clone(),
            tagline: self.tagline.clone(),
            top_stores: self.top_stores(),
            db_locked: self.db_locked,
            db_hint: self.db_locked.then_some(ACCESS_DENIED_HINT),
        }
    }

    // ========== Editor ==========

    pub fn editing(&self) -> Option<&Store> {
        self.editing.as_ref()
    }

    /// 打开空白草稿
    pub fn begin_create(&mut self) -> &Store {
        &*self.editing.insert(new_draft())
    }

    /// 打开已有商家的副本；列表在保存前不变
    pub fn begin_edit(&mut self, id: &str) -> Option<&Store> {
        let store = self.stores.iter().find(|s| s.id == id)?.clone();
        Some(&*self.editing.insert(store))
    }

    /// 替换编辑中的草稿
    pub fn update_draft(&mut self, store: Store) {
        self.editing = Some(store);
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// 保存编辑中的草稿
    ///
    /// 校验失败时不发起任何写入，草稿保留在编辑器中。
    /// 成功后替换列表中相同 ID 的记录 (或追加)，并关闭编辑器。
    pub async fn save(&mut self) -> AppResult<Store> {
        let draft = self
            .editing
            .as_ref()
            .ok_or_else(|| AppError::invalid("No store is being edited"))?;
        validate_for_save(draft)?;

        self.client.upsert_store(draft).await?;

        let saved = self.editing.take().unwrap_or_default();
        match self.stores.iter_mut().find(|s| s.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => self.stores.push(saved.clone()),
        }
        tracing::info!(store_id = %saved.id, name = %saved.name, "Store saved");
        Ok(saved)
    }

    /// 把 `store` 放入编辑器并保存
    pub async fn save_store(&mut self, store: Store) -> AppResult<Store> {
        self.update_draft(store);
        self.save().await
    }

    /// 复制商家并立即写入，然后重新读取列表
    pub async fn duplicate(&mut self, id: &str) -> AppResult<Store> {
        let source = self
            .stores
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found(format!("Store {id}")))?;
        let copy = duplicate_store(source);

        self.client.upsert_store(&copy).await?;
        tracing::info!(source_id = %id, store_id = %copy.id, "Store duplicated");

        self.refresh().await?;
        Ok(copy)
    }

    /// 删除商家：远端删除失败只记录，内存列表总是移除
    pub async fn delete(&mut self, id: &str) -> Soft<()> {
        let result = self.client.delete_store(id).await;
        self.stores.retain(|s| s.id != id);
        if self.editing.as_ref().is_some_and(|s| s.id == id) {
            self.editing = None;
        }
        tracing::info!(store_id = %id, degraded = result.is_degraded(), "Store deleted");
        result
    }

    /// 更新标语 (合并写入)
    pub async fn set_tagline(&mut self, tagline: &str) -> AppResult<Soft<()>> {
        validate_text_len(tagline, "Tagline", MAX_TAGLINE_LEN)?;
        let result = self.client.set_tagline(tagline).await;
        if !result.is_degraded() {
            self.tagline = tagline.to_string();
        }
        Ok(result)
    }
}
