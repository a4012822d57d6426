//! Settings export and import
//!
//! Exports are the pretty-printed storage document. Imports are parsed and
//! normalized in full before anything is written, so a rejected file leaves
//! storage as it was.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{GlobalSettings, SettingsDocument};
use crate::constants::config::EXPORT_FILENAME;
use crate::constants::storage::SEARCH_ENGINES;
use crate::model::Item;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Settings file has no searchEngines list")]
    MissingEngines,
}

/// Import shape: `globalSettings` may be missing or null
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    search_engines: Vec<Item>,
    #[serde(default)]
    global_settings: Option<GlobalSettings>,
}

/// Pretty JSON for an export file
pub fn export_json(document: &SettingsDocument) -> Result<String> {
    serde_json::to_string_pretty(document).context("Failed to serialize settings for export")
}

/// Parse and normalize an import file's contents
pub fn parse_import(text: &str) -> Result<SettingsDocument, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.get(SEARCH_ENGINES).is_some_and(Value::is_array) {
        return Err(ImportError::MissingEngines);
    }

    let document: ImportDocument = serde_json::from_value(value)?;
    Ok(SettingsDocument {
        search_engines: normalize(document.search_engines),
        global_settings: document.global_settings.unwrap_or_default(),
    })
}

/// Drop repeated ids (first wins), sort by stored order (ties keep array
/// position) and renumber `0..len`
pub fn normalize(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut normalized: Vec<Item> = items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.id().to_string());
            if !fresh {
                debug!(id = item.id(), "Dropping duplicate id from import");
            }
            fresh
        })
        .collect();
    normalized.sort_by_key(Item::order);
    for (index, item) in normalized.iter_mut().enumerate() {
        item.set_order(index as i64);
    }
    normalized
}

/// `<dir>/search-shortcuts-settings.json`
pub fn default_export_path(dir: &Path) -> PathBuf {
    dir.join(EXPORT_FILENAME)
}

pub fn write_export(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create export directory {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write export to {:?}", path))?;
    info!(path = %path.display(), "Settings exported");
    Ok(())
}

pub fn read_import(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read import file {:?}", path))
}
