//! 进程内文档存储
//!
//! 用于开发环境和测试。增量在 DashMap 分片锁内完成，并发递增不会丢失。
//! 支持故障注入，用来验证哪些操作会降级、哪些会向上传播。

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::document::{self, DocPath, Document, FieldPath};
use super::{DbResult, DocumentStore, PersistenceError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<DocPath, Document>,
    fault: Mutex<Option<PersistenceError>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的每个操作都返回 `error`，直到 [`clear_fault`](Self::clear_fault)
    pub fn fail_with(&self, error: PersistenceError) {
        *self.fault.lock() = Some(error);
    }

    pub fn clear_fault(&self) {
        *self.fault.lock() = None;
    }

    /// 已执行的读操作次数 (含失败)
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// 已执行的写操作次数 (含失败)
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// 直接读取文档 (不计数，不受故障注入影响)
    pub fn snapshot(&self, path: &DocPath) -> Option<Document> {
        self.docs.get(path).map(|d| d.value().clone())
    }

    fn begin_read(&self) -> DbResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_fault()
    }

    fn begin_write(&self) -> DbResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_fault()
    }

    fn check_fault(&self) -> DbResult<()> {
        match self.fault.lock().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, path: &DocPath) -> DbResult<Option<Document>> {
        self.begin_read()?;
        Ok(self.docs.get(path).map(|d| d.value().clone()))
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>> {
        self.begin_read()?;
        Ok(self
            .docs
            .iter()
            .filter(|entry| entry.key().collection == collection)
            .map(|entry| (entry.key().id.clone(), entry.value().clone()))
            .collect())
    }

    async fn set(&self, path: &DocPath, doc: Document) -> DbResult<()> {
        self.begin_write()?;
        self.docs.insert(path.clone(), doc);
        Ok(())
    }

    async fn merge(&self, path: &DocPath, doc: Document) -> DbResult<()> {
        self.begin_write()?;
        let mut entry = self.docs.entry(path.clone()).or_default();
        document::deep_merge(entry.value_mut(), doc);
        Ok(())
    }

    async fn create(&self, path: &DocPath, doc: Document) -> DbResult<bool> {
        self.begin_write()?;
        match self.docs.entry(path.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(doc);
                Ok(true)
            }
        }
    }

    async fn increment(&self, path: &DocPath, field: &FieldPath, delta: i64) -> DbResult<()> {
        self.begin_write()?;
        let mut entry = self
            .docs
            .get_mut(path)
            .ok_or_else(|| PersistenceError::NotFound(path.to_string()))?;
        document::apply_increment(entry.value_mut(), field, delta);
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> DbResult<()> {
        self.begin_write()?;
        self.docs.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_only_when_absent() {
        let store = MemoryStore::new();
        let path = DocPath::new("system", "settings");
        assert!(store.create(&path, doc(json!({"tagline": "a"}))).await.unwrap());
        assert!(!store.create(&path, doc(json!({"tagline": "b"}))).await.unwrap());
        assert_eq!(store.snapshot(&path).unwrap()["tagline"], "a");
    }

    #[tokio::test]
    async fn test_increment_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .increment(&DocPath::new("system", "analytics"), &FieldPath::new("views"), 1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_collection() {
        let store = MemoryStore::new();
        store.set(&DocPath::new("stores", "1"), doc(json!({"name": "a"}))).await.unwrap();
        store.set(&DocPath::new("stores", "2"), doc(json!({"name": "b"}))).await.unwrap();
        store.set(&DocPath::new("system", "settings"), doc(json!({}))).await.unwrap();
        let mut ids: Vec<String> = store
            .list("stores")
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_fault_injection_counts_attempts() {
        let store = MemoryStore::new();
        store.fail_with(PersistenceError::AccessDenied("rules".into()));
        assert!(store.list("stores").await.unwrap_err().is_access_denied());
        assert_eq!(store.read_count(), 1);
        store.clear_fault();
        assert!(store.list("stores").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let path = DocPath::new("stores", "gone");
        store.delete(&path).await.unwrap();
        store.delete(&path).await.unwrap();
        assert_eq!(store.write_count(), 2);
    }
}
