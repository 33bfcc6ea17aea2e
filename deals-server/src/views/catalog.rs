//! Catalog View

use serde::{Deserialize, Serialize};
use shared::models::{ParseStoreTypeError, Store, StoreType};
use std::fmt;
use std::str::FromStr;

use crate::db::{DbResult, PersistenceClient};

const ALL: &str = "All";

/// 分类筛选：`All` 或单一分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(StoreType),
}

impl CategoryFilter {
    pub fn matches(&self, store: &Store) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(t) => store.store_type == *t,
        }
    }

    /// 分类栏：`All` 加全部分类
    pub fn options() -> Vec<String> {
        std::iter::once(ALL.to_string())
            .chain(StoreType::ALL.iter().map(|t| t.to_string()))
            .collect()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Only(t) => t.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseStoreTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL) {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// 保持原有顺序的分类筛选
pub fn filter_stores(stores: Vec<Store>, filter: CategoryFilter) -> Vec<Store> {
    match filter {
        CategoryFilter::All => stores,
        filter => stores.into_iter().filter(|s| filter.matches(s)).collect(),
    }
}

/// Catalog query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// 首页数据
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub tagline: String,
    pub categories: Vec<String>,
    pub active_category: String,
    pub stores: Vec<Store>,
}

/// 打开首页：记录一次浏览，然后加载全部分类
pub async fn open_catalog(client: &PersistenceClient) -> DbResult<CatalogPage> {
    client.record_page_view().await;
    load_catalog(client, CategoryFilter::All).await
}

/// 读取标语和商家列表，再按分类筛选
///
/// 切换分类不是新的页面访问，不写入统计。
pub async fn load_catalog(
    client: &PersistenceClient,
    filter: CategoryFilter,
) -> DbResult<CatalogPage> {
    let stores = client.list_stores().await?;
    let tagline = client.get_tagline().await.into_value();

    Ok(CatalogPage {
        tagline,
        categories: CategoryFilter::options(),
        active_category: filter.to_string(),
        stores: filter_stores(stores, filter),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, PersistenceError};
    use std::sync::Arc;

    fn store(id: &str, store_type: StoreType) -> Store {
        Store {
            id: id.into(),
            store_type,
            name: format!("Store {id}"),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Store> {
        vec![
            store("1", StoreType::Restaurants),
            store("2", StoreType::Grocery),
            store("3", StoreType::Restaurants),
            store("4", StoreType::More),
        ]
    }

    #[test]
    fn test_all_returns_everything_in_order() {
        assert_eq!(filter_stores(sample(), CategoryFilter::All), sample());
    }

    #[test]
    fn test_category_returns_exact_subset() {
        for t in StoreType::ALL {
            let filtered = filter_stores(sample(), CategoryFilter::Only(t));
            let expected: Vec<Store> = sample().into_iter().filter(|s| s.store_type == t).collect();
            assert_eq!(filtered, expected);
        }
        let ids: Vec<String> = filter_stores(sample(), CategoryFilter::Only(StoreType::Restaurants))
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "salon".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(StoreType::Salon)
        );
        assert!("Books".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::options().len(), 8);
        assert_eq!(CategoryFilter::options()[0], "All");
    }

    #[tokio::test]
    async fn test_open_catalog_records_one_view() {
        let memory = Arc::new(MemoryStore::new());
        let client = PersistenceClient::new(memory.clone(), "Tagline");
        for s in sample() {
            client.upsert_store(&s).await.unwrap();
        }

        let page = open_catalog(&client).await.unwrap();
        assert_eq!(page.stores.len(), 4);
        assert_eq!(page.active_category, "All");
        assert_eq!(page.tagline, "Tagline");
        assert_eq!(client.get_analytics().await.into_value().views, 1);
    }

    #[tokio::test]
    async fn test_category_switch_records_no_view() {
        let memory = Arc::new(MemoryStore::new());
        let client = PersistenceClient::new(memory.clone(), "Tagline");
        for s in sample() {
            client.upsert_store(&s).await.unwrap();
        }

        open_catalog(&client).await.unwrap();
        let page = load_catalog(&client, CategoryFilter::Only(StoreType::Grocery))
            .await
            .unwrap();
        assert_eq!(page.stores.len(), 1);
        assert_eq!(page.active_category, "Grocery");
        load_catalog(&client, CategoryFilter::Only(StoreType::Salon))
            .await
            .unwrap();
        load_catalog(&client, CategoryFilter::All).await.unwrap();

        assert_eq!(client.get_analytics().await.into_value().views, 1);
    }

    #[tokio::test]
    async fn test_load_catalog_propagates_listing_failure() {
        let memory = Arc::new(MemoryStore::new());
        let client = PersistenceClient::new(memory.clone(), "Tagline");
        memory.fail_with(PersistenceError::AccessDenied("rules".into()));
        let err = open_catalog(&client).await.unwrap_err();
        assert!(err.is_access_denied());
    }
}
