//! Host capabilities consumed by the core
//!
//! Every method is async because the host APIs suspend. The host runs one
//! task body at a time, so implementations are free to use `Cell`/`RefCell`
//! and the futures carry no `Send` bound.

#![allow(async_fn_in_trait)]

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::pages::RESTRICTED_PREFIXES;

pub mod desktop;
pub mod memory;

/// Durable key-value persistence
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write all entries as one unit; readers never see a subset
    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()>;
}

/// Failures reported by the native menu API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("duplicate menu id: {0}")]
    DuplicateId(String),
    #[error("menu item creation failed: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemKind {
    Normal,
    Separator,
}

/// One native context menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemSpec {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: Option<String>,
    pub kind: MenuItemKind,
    pub contexts: Vec<String>,
}

/// Native context menu tree
pub trait MenuHost {
    /// Remove every entry this extension created
    async fn clear(&self) -> Result<(), MenuError>;

    async fn create_item(&self, spec: MenuItemSpec) -> Result<(), MenuError>;
}

/// Browser tab/window control
pub trait TabHost {
    async fn open_tab(&self, url: &str) -> Result<()>;
    async fn open_window(&self, url: &str) -> Result<()>;
    async fn open_options_page(&self) -> Result<()>;
}

/// The page a command fired on
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    #[serde(default)]
    pub tab_id: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PageContext {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            tab_id: None,
            url: Some(url.into()),
        }
    }

    /// Browser-internal pages refuse script access
    pub fn is_restricted(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| RESTRICTED_PREFIXES.iter().any(|prefix| url.starts_with(prefix)))
    }
}

/// Reads the active text selection from a page
pub trait SelectionSource {
    async fn selected_text(&self, page: &PageContext) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_pages() {
        assert!(PageContext::with_url("chrome://extensions/shortcuts").is_restricted());
        assert!(PageContext::with_url("chrome-extension://abc/options.html").is_restricted());
        assert!(!PageContext::with_url("https://example.com").is_restricted());
        assert!(!PageContext::default().is_restricted());
    }
}
