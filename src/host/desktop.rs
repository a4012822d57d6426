//! Hosts backed by the local machine: a JSON file and the default browser

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{KeyValueStore, PageContext, SelectionSource, TabHost};
use crate::constants;

/// Both storage keys kept in one JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/search-shortcuts/storage.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(constants::config::APP_DIR);
        path.push(constants::config::FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage from {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse storage JSON from {:?}", self.path))
    }

    /// Write to a sibling temp file, then rename over the target
    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create storage directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(document).context("Failed to serialize storage to JSON")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).with_context(|| format!("Failed to write storage to {:?}", tmp_path))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to move {:?} into place at {:?}", tmp_path, self.path))?;

        debug!(path = %self.path.display(), "Storage written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut document = self.read_document()?;
        for (key, value) in entries {
            document.insert(key, value);
        }
        self.write_document(&document)
    }
}

/// Opens URLs with the system's default handler.
///
/// A desktop browser decides on its own whether a new tab or a new window
/// appears; the requested target is only logged.
#[derive(Debug, Clone)]
pub struct DesktopTabs {
    options_path: PathBuf,
}

impl DesktopTabs {
    /// `options_path` is opened when the menu's "Options..." leaf is used
    pub fn new(options_path: impl Into<PathBuf>) -> Self {
        Self {
            options_path: options_path.into(),
        }
    }
}

impl TabHost for DesktopTabs {
    async fn open_tab(&self, url: &str) -> Result<()> {
        info!(url, target = "tab", "Opening search");
        open::that(url).with_context(|| format!("Failed to open {url}"))
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        info!(url, target = "window", "Opening search");
        open::that(url).with_context(|| format!("Failed to open {url}"))
    }

    async fn open_options_page(&self) -> Result<()> {
        info!(path = %self.options_path.display(), "Opening options");
        open::that(&self.options_path).with_context(|| format!("Failed to open {:?}", self.options_path))
    }
}

/// Selection supplied on the command line
#[derive(Debug, Clone)]
pub struct ArgumentSelection {
    text: String,
}

impl ArgumentSelection {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SelectionSource for ArgumentSelection {
    async fn selected_text(&self, _page: &PageContext) -> Result<String> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nope.json"));
        assert_eq!(storage.get("searchEngines").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_merges_keys_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("storage.json"));

        storage.set(vec![("a".into(), json!(1))]).await.unwrap();
        storage.set(vec![("b".into(), json!({"x": true}))]).await.unwrap();

        assert_eq!(storage.get("a").await.unwrap(), Some(json!(1)));
        assert_eq!(storage.get("b").await.unwrap(), Some(json!({"x": true})));
        assert!(!storage.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let storage = JsonFileStorage::new(&path);
        assert!(storage.get("a").await.is_err());
    }

    #[test]
    fn test_default_path_uses_app_dir() {
        let path = JsonFileStorage::default_path();
        assert!(path.ends_with("search-shortcuts/storage.json"));
    }
}
