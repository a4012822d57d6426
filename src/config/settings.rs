//! Global settings and the full settings document (storage + export shape)

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::model::{Item, SearchEntry};

/// Behavior that applies to every engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Open results in a new tab (`true`) or a new window (`false`)
    #[serde(default = "default_open_in_new_tab")]
    pub open_in_new_tab: bool,
}

fn default_open_in_new_tab() -> bool {
    defaults::OPEN_IN_NEW_TAB
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            open_in_new_tab: default_open_in_new_tab(),
        }
    }
}

/// Everything the extension persists, as exported to and imported from file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub search_engines: Vec<Item>,
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            search_engines: default_search_engines(),
            global_settings: GlobalSettings::default(),
        }
    }
}

/// Engines seeded into empty storage, orders 0..N-1, all visible
pub fn default_search_engines() -> Vec<Item> {
    defaults::SEARCH_ENGINES
        .iter()
        .enumerate()
        .map(|(order, (id, name, url))| {
            let mut entry = SearchEntry::new(*id, *name, *url);
            entry.order = order as i64;
            Item::Search(entry)
        })
        .collect()
}
