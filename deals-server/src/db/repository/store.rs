//! Store Repository

use shared::models::Store;
use std::sync::Arc;

use super::{BaseRepository, from_document, to_document};
use crate::db::{DbResult, DocPath, DocumentStore};

const COLLECTION: &str = "stores";

#[derive(Clone)]
pub struct StoreRepository {
    base: BaseRepository,
}

impl StoreRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    fn path(id: &str) -> DocPath {
        DocPath::new(COLLECTION, id)
    }

    /// 全部商家 (顺序不保证)
    ///
    /// 文档 key 作为 `id`；无法解码的记录跳过并记录警告。
    pub async fn find_all(&self) -> DbResult<Vec<Store>> {
        let docs = self.base.store().list(COLLECTION).await?;
        let mut stores = Vec::with_capacity(docs.len());
        for (id, doc) in docs {
            match from_document::<Store>(doc) {
                Ok(mut store) => {
                    store.id = id;
                    stores.push(store);
                }
                Err(e) => {
                    tracing::warn!(store_id = %id, error = %e, "Skipping undecodable store record");
                }
            }
        }
        Ok(stores)
    }

    /// 整体覆盖写入 (不存在则创建)
    pub async fn upsert(&self, store: &Store) -> DbResult<()> {
        let doc = to_document(store)?;
        self.base.store().set(&Self::path(&store.id), doc).await
    }

    /// 删除 (不存在不报错)
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.base.store().delete(&Self::path(id)).await
    }
}
