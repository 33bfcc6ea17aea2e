//! Shared types for the deals directory
//!
//! Domain models and small utilities used by the server and its tests.

pub mod models;
pub mod util;

// Re-exports
pub use models::{Analytics, ClickRank, MenuItem, Offer, Settings, Store, StoreType};
pub use serde::{Deserialize, Serialize};
