//! Admin Controller
//!
//! 后台的纯操作 (新建、复制、保存校验、点击排行) 与有状态的 [`AdminSession`]。

pub mod session;

pub use session::{AdminSession, Dashboard};

use shared::models::{Analytics, ClickRank, Store};
use shared::util::new_store_id;

use crate::utils::AppError;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_LIST_ITEMS, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_PHOTO_LEN,
    MAX_SHORT_TEXT_LEN, validate_required_text, validate_text_len,
};

/// 排行榜条数
pub const TOP_STORES: usize = 5;

/// 复制商家时追加到名称后的后缀
pub const COPY_SUFFIX: &str = " (Copy)";

/// 新建空白商家：新 ID，分类 Restaurants，其余字段为空
pub fn new_draft() -> Store {
    Store::blank(new_store_id())
}

/// 复制商家：新 ID，名称追加 ` (Copy)`，其余字段不变
pub fn duplicate_store(source: &Store) -> Store {
    Store {
        id: new_store_id(),
        name: format!("{}{}", source.name, COPY_SUFFIX),
        ..source.clone()
    }
}

/// 保存前校验
///
/// 名称、地址、照片必填；各字段有长度上限。
pub fn validate_for_save(store: &Store) -> Result<(), AppError> {
    if store.id.trim().is_empty() {
        return Err(AppError::validation("Store id must not be empty"));
    }
    validate_required_text(&store.name, "Name", MAX_NAME_LEN)?;
    validate_required_text(&store.address, "Address", MAX_ADDRESS_LEN)?;
    validate_required_text(&store.photo, "Photo", MAX_PHOTO_LEN)?;
    validate_text_len(&store.main_offer, "Main offer", MAX_NOTE_LEN)?;
    validate_text_len(&store.contact, "Contact", MAX_SHORT_TEXT_LEN)?;

    if store.menu.len() > MAX_LIST_ITEMS || store.offers.len() > MAX_LIST_ITEMS {
        return Err(AppError::validation(format!(
            "Too many menu items or offers (max {MAX_LIST_ITEMS})"
        )));
    }
    for item in &store.menu {
        validate_text_len(&item.name, "Menu item name", MAX_NAME_LEN)?;
        validate_text_len(&item.price, "Menu item price", MAX_SHORT_TEXT_LEN)?;
    }
    for offer in &store.offers {
        validate_text_len(&offer.title, "Offer title", MAX_NAME_LEN)?;
        validate_text_len(&offer.description, "Offer description", MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// 点击排行：按点击数降序 (相同点击数保持原顺序)，取前 `limit` 个
pub fn rank_by_clicks(stores: &[Store], analytics: &Analytics, limit: usize) -> Vec<ClickRank> {
    let mut rows: Vec<ClickRank> = stores
        .iter()
        .map(|s| ClickRank {
            id: s.id.clone(),
            name: s.name.clone(),
            clicks: analytics.clicks_for(&s.id),
        })
        .collect();
    rows.sort_by(|a, b| b.clicks.cmp(&a.clicks));
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MenuItem, StoreType};

    fn named(id: &str) -> Store {
        Store {
            id: id.into(),
            name: id.into(),
            ..Default::default()
        }
    }

    fn valid() -> Store {
        Store {
            id: "1".into(),
            name: "Spice Hub".into(),
            address: "Super Market, Gulbarga".into(),
            photo: "https://example.com/a.jpg".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_by_clicks() {
        let stores: Vec<Store> = ["A", "B", "C", "D", "E", "F"].into_iter().map(named).collect();
        let mut analytics = Analytics::default();
        for (id, n) in [("A", 5), ("B", 2), ("C", 9), ("D", 0), ("E", 1), ("F", 3)] {
            analytics.clicks.insert(id.into(), n);
        }
        let ranked: Vec<String> = rank_by_clicks(&stores, &analytics, TOP_STORES)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ranked, vec!["C", "A", "F", "B", "E"]);
    }

    #[test]
    fn test_rank_ties_keep_list_order_and_missing_counts_zero() {
        let stores: Vec<Store> = ["X", "Y", "Z"].into_iter().map(named).collect();
        let mut analytics = Analytics::default();
        analytics.clicks.insert("Z".into(), 1);
        analytics.clicks.insert("ghost".into(), 100);
        let ranked = rank_by_clicks(&stores, &analytics, TOP_STORES);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "X", "Y"]);
        assert_eq!(ranked[1].clicks, 0);
    }

    #[test]
    fn test_duplicate_store() {
        let mut source = valid();
        source.store_type = StoreType::Pharma;
        source.menu.push(MenuItem {
            name: "Syrup".into(),
            price: "90".into(),
        });
        let copy = duplicate_store(&source);
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, "Spice Hub (Copy)");
        assert_eq!(
            Store {
                id: source.id.clone(),
                name: source.name.clone(),
                ..copy
            },
            source
        );
    }

    #[test]
    fn test_new_draft() {
        let draft = new_draft();
        assert!(!draft.id.is_empty());
        assert_eq!(draft.store_type, StoreType::Restaurants);
        assert!(draft.name.is_empty() && draft.menu.is_empty() && draft.offers.is_empty());
    }

    #[test]
    fn test_validate_for_save() {
        assert!(validate_for_save(&valid()).is_ok());
        for field in ["name", "address", "photo"] {
            let mut store = valid();
            match field {
                "name" => store.name = "  ".into(),
                "address" => store.address.clear(),
                _ => store.photo.clear(),
            }
            assert!(matches!(validate_for_save(&store), Err(AppError::Validation(_))));
        }
        let mut long = valid();
        long.contact = "9".repeat(MAX_SHORT_TEXT_LEN + 1);
        assert!(validate_for_save(&long).is_err());
    }
}
