//! Settings Model (Singleton)
//!
//! 站点设置，对应 `system/settings` 文档

use serde::{Deserialize, Serialize};

use super::serde_helpers::null_default;

/// 首次初始化时写入的默认标语
pub const DEFAULT_TAGLINE: &str = "Gulbarga's Premier Guide for #1 Offers";

/// Site settings entity
///
/// 只通过 merge 写入 `tagline`，文档中的其他字段保持不变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, deserialize_with = "null_default")]
    pub tagline: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tagline: DEFAULT_TAGLINE.to_string(),
        }
    }
}

/// Update tagline payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaglineUpdate {
    pub tagline: String,
}
