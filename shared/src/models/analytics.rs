//! Analytics Model (Singleton)
//!
//! 浏览/点击计数，对应 `system/analytics` 文档。
//! 计数只增不减，缺失的 key 视为 0。

use serde::{Deserialize, Serialize};

use super::serde_helpers::null_default;
use std::collections::HashMap;

/// Analytics entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    /// 首页浏览次数
    #[serde(default, deserialize_with = "null_default")]
    pub views: u64,
    /// 商家 ID -> 详情页访问次数
    #[serde(default, deserialize_with = "null_default")]
    pub clicks: HashMap<String, u64>,
}

impl Analytics {
    /// 指定商家的点击数 (缺失为 0)
    pub fn clicks_for(&self, store_id: &str) -> u64 {
        self.clicks.get(store_id).copied().unwrap_or(0)
    }
}

/// 排行榜中的一行 (Top 商家柱状图数据)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRank {
    pub id: String,
    pub name: String,
    pub clicks: u64,
}
