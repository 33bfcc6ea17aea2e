//! Database Module
//!
//! 托管文档数据库的访问层。
//!
//! # 结构
//!
//! - [`DocumentStore`] - 文档存储抽象 (get/list/set/merge/create/increment/delete)
//! - [`firestore`] - Firestore REST 后端
//! - [`memory`] - 进程内后端 (开发与测试)
//! - [`repository`] - 三类文档的仓储
//! - [`PersistenceClient`] - 面向视图与后台的统一入口

pub mod client;
pub mod document;
pub mod error;
pub mod firestore;
pub mod memory;
pub mod repository;

pub use client::{BatchSaveError, PersistenceClient};
pub use document::{DocPath, Document, FieldPath};
pub use error::{ACCESS_DENIED_HINT, DbResult, PersistenceError, Soft};
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;

use async_trait::async_trait;

/// 文档存储抽象
///
/// 语义与托管文档数据库保持一致：
///
/// | 操作 | 说明 |
/// |------|------|
/// | `set` | 整体覆盖，不存在则创建 |
/// | `merge` | 深度合并叶子字段，不存在则创建 |
/// | `create` | 仅在不存在时创建，已存在返回 `false` |
/// | `increment` | 原子增量，文档不存在返回 `NotFound` |
/// | `delete` | 幂等删除 |
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// 后端名称 (用于日志和健康检查)
    fn backend(&self) -> &'static str;

    async fn get(&self, path: &DocPath) -> DbResult<Option<Document>>;

    /// 集合中的全部文档，顺序不保证
    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>>;

    async fn set(&self, path: &DocPath, doc: Document) -> DbResult<()>;

    async fn merge(&self, path: &DocPath, doc: Document) -> DbResult<()>;

    async fn create(&self, path: &DocPath, doc: Document) -> DbResult<bool>;

    async fn increment(&self, path: &DocPath, field: &FieldPath, delta: i64) -> DbResult<()>;

    async fn delete(&self, path: &DocPath) -> DbResult<()>;
}
