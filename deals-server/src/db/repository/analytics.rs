//! Analytics Repository (Singleton)
//!
//! 计数通过存储层的原子增量完成。文档缺失时先以默认值创建 (仅在不存在时)，
//! 再重新执行增量，并发的首次写入不会互相覆盖。

use shared::models::Analytics;
use std::sync::Arc;

use super::{BaseRepository, SYSTEM_COLLECTION, from_document, to_document};
use crate::db::{DbResult, DocPath, DocumentStore, FieldPath, PersistenceError};

const SINGLETON_ID: &str = "analytics";

#[derive(Clone)]
pub struct AnalyticsRepository {
    base: BaseRepository,
}

impl AnalyticsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    fn path() -> DocPath {
        DocPath::new(SYSTEM_COLLECTION, SINGLETON_ID)
    }

    /// Get the singleton analytics
    pub async fn get(&self) -> DbResult<Option<Analytics>> {
        match self.base.store().get(&Self::path()).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// 不存在时以 `{views: 0, clicks: {}}` 创建，返回是否发生了写入
    pub async fn ensure_exists(&self) -> DbResult<bool> {
        if self.base.store().get(&Self::path()).await?.is_some() {
            return Ok(false);
        }
        self.create_default().await
    }

    async fn create_default(&self) -> DbResult<bool> {
        let doc = to_document(&Analytics::default())?;
        self.base.store().create(&Self::path(), doc).await
    }

    /// `views += 1`
    pub async fn increment_views(&self) -> DbResult<()> {
        self.increment(FieldPath::new("views")).await
    }

    /// `clicks[store_id] += 1`
    pub async fn increment_click(&self, store_id: &str) -> DbResult<()> {
        self.increment(FieldPath::new("clicks").child(store_id)).await
    }

    async fn increment(&self, field: FieldPath) -> DbResult<()> {
        let path = Self::path();
        match self.base.store().increment(&path, &field, 1).await {
            Err(PersistenceError::NotFound(_)) => {
                tracing::info!(field = %field, "Analytics document missing, creating with defaults");
                self.create_default().await?;
                self.base.store().increment(&path, &field, 1).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_increment_creates_missing_document() {
        let repo = AnalyticsRepository::new(Arc::new(MemoryStore::new()));
        repo.increment_click("17").await.unwrap();
        repo.increment_views().await.unwrap();

        let analytics = repo.get().await.unwrap().unwrap();
        assert_eq!(analytics.views, 1);
        assert_eq!(analytics.clicks_for("17"), 1);
    }

    #[tokio::test]
    async fn test_ensure_exists_is_idempotent() {
        let memory = Arc::new(MemoryStore::new());
        let repo = AnalyticsRepository::new(memory.clone());
        assert!(repo.ensure_exists().await.unwrap());
        repo.increment_views().await.unwrap();
        assert!(!repo.ensure_exists().await.unwrap());
        assert_eq!(repo.get().await.unwrap().unwrap().views, 1);
    }
}
