//! Store Model
//!
//! 商家 (deal) 记录，存储在 `stores/{id}` 文档中。
//! 字段名与文档字段保持一致 (camelCase)，`type` 为分类。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::serde_helpers::null_default;

/// 商家分类
///
/// 未知的分类名 (例如旧数据) 反序列化为 [`StoreType::More`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreType {
    #[default]
    Restaurants,
    Clothing,
    Grocery,
    Pharma,
    Salon,
    Electronics,
    #[serde(other)]
    More,
}

impl StoreType {
    /// 所有分类，按分类栏顺序
    pub const ALL: [StoreType; 7] = [
        StoreType::Restaurants,
        StoreType::Clothing,
        StoreType::Grocery,
        StoreType::Pharma,
        StoreType::Salon,
        StoreType::Electronics,
        StoreType::More,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Restaurants => "Restaurants",
            StoreType::Clothing => "Clothing",
            StoreType::Grocery => "Grocery",
            StoreType::Pharma => "Pharma",
            StoreType::Salon => "Salon",
            StoreType::Electronics => "Electronics",
            StoreType::More => "More",
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown store category: {0}")]
pub struct ParseStoreTypeError(pub String);

impl FromStr for StoreType {
    type Err = ParseStoreTypeError;

    /// 大小写不敏感
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        StoreType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseStoreTypeError(trimmed.to_string()))
    }
}

/// 菜单项 (价格为自由文本，如 "₹120")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub price: String,
}

/// 优惠项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

/// Store entity
///
/// `menu` / `offers` 缺失时等同于空列表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_default")]
    pub store_type: StoreType,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// 图片 URL 或 data URL
    #[serde(default, deserialize_with = "null_default")]
    pub photo: String,
    /// 主推优惠 (如 "50% OFF")
    #[serde(default, deserialize_with = "null_default")]
    pub main_offer: String,
    #[serde(default, deserialize_with = "null_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_default")]
    pub contact: String,
    #[serde(default, deserialize_with = "null_default")]
    pub menu: Vec<MenuItem>,
    #[serde(default, deserialize_with = "null_default")]
    pub offers: Vec<Offer>,
}

impl Store {
    /// 空白记录 (新建时打开编辑器用)
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_menu_and_offers_default_to_empty() {
        let json = r#"{
            "id": "1700000000000",
            "type": "Grocery",
            "name": "Fresh Mart",
            "photo": "https://example.com/a.jpg",
            "mainOffer": "10% OFF",
            "address": "Main Road",
            "contact": "99999"
        }"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert_eq!(store.store_type, StoreType::Grocery);
        assert_eq!(store.main_offer, "10% OFF");
        assert!(store.menu.is_empty());
        assert!(store.offers.is_empty());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let json = r#"{
            "id": "1",
            "type": "Grocery",
            "name": "Fresh Mart",
            "photo": null,
            "mainOffer": null,
            "menu": null,
            "offers": null
        }"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert_eq!(store.name, "Fresh Mart");
        assert_eq!(store.photo, "");
        assert!(store.menu.is_empty());
        assert!(store.offers.is_empty());

        let store: Store = serde_json::from_str(r#"{"id":"2","type":null}"#).unwrap();
        assert_eq!(store.store_type, StoreType::Restaurants);
    }

    #[test]
    fn test_wire_field_names() {
        let store = Store {
            id: "42".to_string(),
            store_type: StoreType::Salon,
            main_offer: "Free trim".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["type"], "Salon");
        assert_eq!(value["mainOffer"], "Free trim");
        assert!(value.get("store_type").is_none());
    }

    #[test]
    fn test_unknown_category_reads_as_more() {
        let store: Store = serde_json::from_str(r#"{"id":"1","type":"Bakery"}"#).unwrap();
        assert_eq!(store.store_type, StoreType::More);
    }

    #[test]
    fn test_store_type_from_str() {
        assert_eq!("pharma".parse::<StoreType>().unwrap(), StoreType::Pharma);
        assert_eq!(" Electronics ".parse::<StoreType>().unwrap(), StoreType::Electronics);
        assert!("All".parse::<StoreType>().is_err());
    }
}
