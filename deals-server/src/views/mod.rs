//! Views Module
//!
//! 公开页面的数据组装：
//!
//! - [`catalog`] - 首页列表与分类筛选
//! - [`detail`] - 商家详情页

pub mod catalog;
pub mod detail;

pub use catalog::{CatalogPage, CategoryFilter, filter_stores, load_catalog, open_catalog};
pub use detail::{DetailView, load_detail};
