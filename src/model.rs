//! Configuration entries: search engines and separators

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::constants::template::PLACEHOLDER;

/// A search engine the user can invoke against selected text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: String,
    pub name: String,
    /// URL with a `%s` query placeholder (stored as `url` for compatibility)
    #[serde(rename = "url")]
    pub url_template: String,
    pub show_in_context_menu: bool,
    pub order: i64,
}

impl SearchEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url_template: url_template.into(),
            show_in_context_menu: true,
            order: 0,
        }
    }
}

/// Visual divider between groups of engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    pub id: String,
    pub order: i64,
}

impl Separator {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), order: 0 }
    }
}

/// One configuration entry.
///
/// Serializes with a `type` tag (`"search"` / `"separator"`). Deserialization
/// goes through [`RawItem`] so records written before separators existed
/// (no `type` field) still load as search entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", from = "RawItem")]
pub enum Item {
    Search(SearchEntry),
    Separator(Separator),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Search(entry) => &entry.id,
            Item::Separator(sep) => &sep.id,
        }
    }

    pub fn order(&self) -> i64 {
        match self {
            Item::Search(entry) => entry.order,
            Item::Separator(sep) => sep.order,
        }
    }

    pub fn set_order(&mut self, order: i64) {
        match self {
            Item::Search(entry) => entry.order = order,
            Item::Separator(sep) => sep.order = order,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Item::Separator(_))
    }

    pub fn as_search(&self) -> Option<&SearchEntry> {
        match self {
            Item::Search(entry) => Some(entry),
            Item::Separator(_) => None,
        }
    }

    /// Separators are always shown; engines follow their toggle
    pub fn is_visible_in_menu(&self) -> bool {
        match self {
            Item::Search(entry) => entry.show_in_context_menu,
            Item::Separator(_) => true,
        }
    }
}

/// Lenient on-disk/import record, normalized into [`Item`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    show_in_context_menu: Option<bool>,
    #[serde(default)]
    order: Option<i64>,
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        let order = raw.order.unwrap_or(0);
        match raw.kind.as_deref() {
            Some("separator") => Item::Separator(Separator { id: raw.id, order }),
            _ => Item::Search(SearchEntry {
                id: raw.id,
                name: raw.name.unwrap_or_default(),
                url_template: raw.url.unwrap_or_default(),
                show_in_context_menu: raw.show_in_context_menu.unwrap_or(true),
                order,
            }),
        }
    }
}

/// Rejections from the add/edit form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("URL must contain %s placeholder for the search query")]
    InvalidTemplate,
}

/// User input for creating or editing a search entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDraft {
    pub name: String,
    pub url: String,
    pub show_in_context_menu: bool,
}

impl EngineDraft {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            show_in_context_menu: true,
        }
    }

    /// Trim the fields and enforce the `%s` placeholder
    pub fn validate(self) -> Result<Self, EngineError> {
        let name = self.name.trim().to_string();
        let url = self.url.trim().to_string();

        if name.is_empty() || url.is_empty() {
            return Err(EngineError::MissingFields);
        }
        if !url.contains(PLACEHOLDER) {
            return Err(EngineError::InvalidTemplate);
        }

        Ok(Self {
            name,
            url,
            show_in_context_menu: self.show_in_context_menu,
        })
    }
}

/// Opaque id: base-36 milliseconds followed by a base-36 random suffix
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let suffix: u64 = rand::random();
    format!("{}{}", to_base36(millis), to_base36(suffix))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
