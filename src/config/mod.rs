//! Configuration management for search-shortcuts
//!
//! - **settings**: the persisted document (item list + global settings) and its defaults
//! - **store**: ConfigStore, typed access to the host key-value store

pub mod settings;
pub mod store;

// Re-export commonly used types
pub use settings::{default_search_engines, GlobalSettings, SettingsDocument};
pub use store::ConfigStore;
