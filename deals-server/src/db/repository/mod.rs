//! Repository Module
//!
//! 三类文档的读写：
//!
//! - [`StoreRepository`] - `stores/{id}` 集合
//! - [`SettingsRepository`] - `system/settings` 单例
//! - [`AnalyticsRepository`] - `system/analytics` 单例

pub mod analytics;
pub mod settings;
pub mod store;

pub use analytics::AnalyticsRepository;
pub use settings::SettingsRepository;
pub use store::StoreRepository;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::{DbResult, DocumentStore, Document, PersistenceError};

/// 单例文档所在集合
pub const SYSTEM_COLLECTION: &str = "system";

/// Base repository with document store reference
#[derive(Clone)]
pub struct BaseRepository {
    store: Arc<dyn DocumentStore>,
}

impl BaseRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}

/// 实体 -> 文档
pub(crate) fn to_document<T: Serialize>(value: &T) -> DbResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(PersistenceError::Malformed(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// 文档 -> 实体
pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> DbResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
