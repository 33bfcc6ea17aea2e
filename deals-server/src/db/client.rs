//! Persistence Client
//!
//! 视图与后台访问文档数据库的唯一入口。
//!
//! 主要操作 (`list_stores` / `upsert_store` / `save_stores`) 直接返回错误；
//! 次要操作 (标语、统计、删除) 返回 [`Soft`]，失败时降级为默认值。

use shared::models::{Analytics, Store};
use std::sync::Arc;
use thiserror::Error;

use super::repository::{AnalyticsRepository, SettingsRepository, StoreRepository};
use super::{DbResult, DocumentStore, PersistenceError, Soft};

/// 批量保存在第 `written` 条之后失败 (之前的写入不回滚)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Batch save stopped after {written} record(s) at store {failed_id}: {source}")]
pub struct BatchSaveError {
    pub written: usize,
    pub failed_id: String,
    #[source]
    pub source: PersistenceError,
}

#[derive(Clone)]
pub struct PersistenceClient {
    backend: &'static str,
    stores: StoreRepository,
    settings: SettingsRepository,
    analytics: AnalyticsRepository,
    default_tagline: Arc<str>,
}

impl std::fmt::Debug for PersistenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceClient")
            .field("backend", &self.backend)
            .field("default_tagline", &self.default_tagline)
            .finish()
    }
}

impl PersistenceClient {
    pub fn new(store: Arc<dyn DocumentStore>, default_tagline: impl Into<Arc<str>>) -> Self {
        Self {
            backend: store.backend(),
            stores: StoreRepository::new(store.clone()),
            settings: SettingsRepository::new(store.clone()),
            analytics: AnalyticsRepository::new(store),
            default_tagline: default_tagline.into(),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn default_tagline(&self) -> &str {
        &self.default_tagline
    }

    /// 确保两个单例文档存在
    pub async fn initialize(&self) -> Soft<()> {
        let result = async {
            if self.settings.ensure_exists(&self.default_tagline).await? {
                tracing::info!("Created settings document with default tagline");
            }
            if self.analytics.ensure_exists().await? {
                tracing::info!("Created analytics document");
            }
            Ok(())
        }
        .await;
        Soft::from_result("initialize", result, || ())
    }

    pub async fn list_stores(&self) -> DbResult<Vec<Store>> {
        self.stores.find_all().await
    }

    pub async fn upsert_store(&self, store: &Store) -> DbResult<()> {
        self.stores.upsert(store).await?;
        tracing::debug!(store_id = %store.id, "Store saved");
        Ok(())
    }

    /// 逐条写入，遇到第一个失败即停止
    pub async fn save_stores(&self, stores: &[Store]) -> Result<usize, BatchSaveError> {
        for (written, store) in stores.iter().enumerate() {
            if let Err(source) = self.stores.upsert(store).await {
                return Err(BatchSaveError {
                    written,
                    failed_id: store.id.clone(),
                    source,
                });
            }
        }
        tracing::info!(count = stores.len(), "Stores saved");
        Ok(stores.len())
    }

    pub async fn delete_store(&self, id: &str) -> Soft<()> {
        Soft::from_result("delete_store", self.stores.delete(id).await, || ())
    }

    /// 当前标语；读取失败、文档缺失或为空时返回默认标语
    pub async fn get_tagline(&self) -> Soft<String> {
        match self.settings.get().await {
            Ok(Some(settings)) if !settings.tagline.is_empty() => Soft::Ok(settings.tagline),
            Ok(_) => Soft::Ok(self.default_tagline.to_string()),
            Err(error) => Soft::degraded("get_tagline", self.default_tagline.to_string(), error),
        }
    }

    pub async fn set_tagline(&self, tagline: &str) -> Soft<()> {
        Soft::from_result("set_tagline", self.settings.set_tagline(tagline).await, || ())
    }

    pub async fn record_page_view(&self) -> Soft<()> {
        Soft::from_result("record_page_view", self.analytics.increment_views().await, || ())
    }

    pub async fn record_store_click(&self, id: &str) -> Soft<()> {
        Soft::from_result(
            "record_store_click",
            self.analytics.increment_click(id).await,
            || (),
        )
    }

    pub async fn get_analytics(&self) -> Soft<Analytics> {
        let result = self.analytics.get().await.map(Option::unwrap_or_default);
        Soft::from_result("get_analytics", result, Analytics::default)
    }
}
