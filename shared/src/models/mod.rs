//! Data models
//!
//! Shared between deals-server and frontend (via API).
//! 三类文档：`stores/{id}`、`system/settings`、`system/analytics`。

pub mod analytics;
pub mod serde_helpers;
pub mod settings;
pub mod store;

// Re-exports
pub use analytics::*;
pub use settings::*;
pub use store::*;
