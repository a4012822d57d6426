//! Application-wide constants
//!
//! Storage keys, menu identifiers and the built-in engine list live here so
//! the store, the menu sync and the import/export path agree on one spelling.

/// Persisted state layout
pub mod storage {
    /// Key holding the ordered item array
    pub const SEARCH_ENGINES: &str = "searchEngines";

    /// Key holding the global settings object
    pub const GLOBAL_SETTINGS: &str = "globalSettings";
}

/// Config file location (under the platform config dir)
pub mod config {
    pub const APP_DIR: &str = "search-shortcuts";
    pub const FILENAME: &str = "storage.json";

    /// Suggested file name for exported settings
    pub const EXPORT_FILENAME: &str = "search-shortcuts-settings.json";
}

/// Native context menu identifiers
pub mod menu {
    pub const PARENT_ID: &str = "search-shortcuts-parent";
    pub const PARENT_TITLE: &str = "Search with...";

    /// Prefix for clickable engine leaves (followed by the item id)
    pub const ENGINE_PREFIX: &str = "search-engine-";

    /// Prefix for separators mirrored from the item list
    pub const SEPARATOR_PREFIX: &str = "separator-";

    pub const TRAILING_SEPARATOR_ID: &str = "search-shortcuts-separator";
    pub const OPTIONS_ID: &str = "search-shortcuts-options";
    pub const OPTIONS_TITLE: &str = "Options...";

    /// Menu context all entries are registered for
    pub const SELECTION_CONTEXT: &str = "selection";
}

/// Keyboard shortcut slots
pub mod shortcuts {
    /// Number of fixed accelerator bindings the host exposes
    pub const SLOT_COUNT: usize = 4;

    /// Command names are `search-1` .. `search-4`
    pub const COMMAND_PREFIX: &str = "search-";
}

/// URL templating
pub mod template {
    /// Query placeholder inside an engine URL
    pub const PLACEHOLDER: &str = "%s";
}

/// Pages the selection reader never asks for text
pub mod pages {
    pub const RESTRICTED_PREFIXES: [&str; 2] = ["chrome://", "chrome-extension://"];
}

/// Engines seeded into empty storage: (id, name, url template)
pub mod defaults {
    pub const SEARCH_ENGINES: [(&str, &str, &str); 5] = [
        ("youtube", "YouTube", "https://www.youtube.com/results?search_query=%s"),
        ("google", "Google", "https://www.google.com/search?q=%s"),
        ("imdb", "IMDb", "http://www.imdb.com/find?s=all&q=%s"),
        ("wikipedia", "Wikipedia", "https://en.wikipedia.org/wiki/Special:Search?search=%s"),
        ("duckduckgo", "DuckDuckGo", "https://duckduckgo.com/?q=%s"),
    ];

    pub const OPEN_IN_NEW_TAB: bool = true;
}
