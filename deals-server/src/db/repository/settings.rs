//! Settings Repository (Singleton)

use serde_json::Value;
use shared::models::Settings;
use std::sync::Arc;

use super::{BaseRepository, SYSTEM_COLLECTION, from_document, to_document};
use crate::db::{DbResult, DocPath, DocumentStore, Document};

const SINGLETON_ID: &str = "settings";

#[derive(Clone)]
pub struct SettingsRepository {
    base: BaseRepository,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    fn path() -> DocPath {
        DocPath::new(SYSTEM_COLLECTION, SINGLETON_ID)
    }

    /// Get the singleton settings
    pub async fn get(&self) -> DbResult<Option<Settings>> {
        match self.base.store().get(&Self::path()).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// 不存在时以默认标语创建，返回是否发生了写入
    pub async fn ensure_exists(&self, default_tagline: &str) -> DbResult<bool> {
        if self.base.store().get(&Self::path()).await?.is_some() {
            return Ok(false);
        }
        let doc = to_document(&Settings {
            tagline: default_tagline.to_string(),
        })?;
        self.base.store().create(&Self::path(), doc).await
    }

    /// 只合并写入 `tagline`
    pub async fn set_tagline(&self, tagline: &str) -> DbResult<()> {
        let mut doc = Document::new();
        doc.insert("tagline".to_string(), Value::String(tagline.to_string()));
        self.base.store().merge(&Self::path(), doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_tagline_preserves_other_fields() {
        let memory = Arc::new(MemoryStore::new());
        let repo = SettingsRepository::new(memory.clone());
        let mut doc = Document::new();
        doc.insert("tagline".into(), json!("old"));
        doc.insert("theme".into(), json!("rose"));
        memory.set(&SettingsRepository::path(), doc).await.unwrap();

        repo.set_tagline("new").await.unwrap();

        let raw = memory.snapshot(&SettingsRepository::path()).unwrap();
        assert_eq!(Value::Object(raw), json!({"tagline": "new", "theme": "rose"}));
        assert_eq!(repo.get().await.unwrap().unwrap().tagline, "new");
    }

    #[tokio::test]
    async fn test_ensure_exists_writes_once() {
        let memory = Arc::new(MemoryStore::new());
        let repo = SettingsRepository::new(memory.clone());
        assert!(repo.ensure_exists("hello").await.unwrap());
        assert!(!repo.ensure_exists("other").await.unwrap());
        assert_eq!(memory.write_count(), 1);
        assert_eq!(repo.get().await.unwrap().unwrap().tagline, "hello");
    }
}
