//! Detail View

use serde::Serialize;
use shared::models::Store;

use crate::db::{DbResult, PersistenceClient};

/// 详情页数据
///
/// `menu` / `offers` 始终是列表 (可能为空)，`has_*` 用于决定是否显示对应区块。
#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    #[serde(flatten)]
    pub store: Store,
    pub has_menu: bool,
    pub has_offers: bool,
}

impl From<Store> for DetailView {
    fn from(store: Store) -> Self {
        Self {
            has_menu: !store.menu.is_empty(),
            has_offers: !store.offers.is_empty(),
            store,
        }
    }
}

/// 加载详情页
///
/// 先记录点击再查找，ID 不存在时同样计数。
pub async fn load_detail(client: &PersistenceClient, id: &str) -> DbResult<Option<DetailView>> {
    client.record_store_click(id).await;
    let stores = client.list_stores().await?;
    Ok(stores.into_iter().find(|s| s.id == id).map(DetailView::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use shared::models::MenuItem;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_detail_without_menu_or_offers() {
        let client = PersistenceClient::new(Arc::new(MemoryStore::new()), "t");
        client.upsert_store(&Store::blank("9")).await.unwrap();

        let view = load_detail(&client, "9").await.unwrap().unwrap();
        assert!(view.store.menu.is_empty());
        assert!(!view.has_menu && !view.has_offers);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["menu"], serde_json::json!([]));
        assert_eq!(json["id"], "9");
        assert_eq!(client.get_analytics().await.into_value().clicks_for("9"), 1);
    }

    #[tokio::test]
    async fn test_missing_store_still_counts_click() {
        let client = PersistenceClient::new(Arc::new(MemoryStore::new()), "t");
        let mut store = Store::blank("1");
        store.menu.push(MenuItem {
            name: "Tea".into(),
            price: "10".into(),
        });
        client.upsert_store(&store).await.unwrap();

        assert!(load_detail(&client, "1").await.unwrap().unwrap().has_menu);
        assert!(load_detail(&client, "404").await.unwrap().is_none());
        let analytics = client.get_analytics().await.into_value();
        assert_eq!(analytics.clicks_for("404"), 1);
        assert_eq!(analytics.clicks_for("1"), 1);
    }
}
