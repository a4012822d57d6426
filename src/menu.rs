//! Keeps the native context menu in step with the stored item list
//!
//! A rebuild clears the whole subtree and recreates it from storage. Only one
//! rebuild runs at a time; a call that arrives while one is in flight returns
//! at once and relies on the next change event to catch up.

use anyhow::{Context, Result};
use std::cell::Cell;
use tracing::{debug, error, info};

use crate::config::ConfigStore;
use crate::constants::menu::{
    ENGINE_PREFIX, OPTIONS_ID, OPTIONS_TITLE, PARENT_ID, PARENT_TITLE, SELECTION_CONTEXT, SEPARATOR_PREFIX,
    TRAILING_SEPARATOR_ID,
};
use crate::host::{KeyValueStore, MenuError, MenuHost, MenuItemKind, MenuItemSpec};
use crate::model::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Another rebuild was already running
    Skipped,
    /// Nothing visible, so no menu at all
    Empty,
    Built { created: usize, failed: usize },
}

/// What a clicked menu id refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    Engine(String),
    Options,
    Other,
}

impl MenuTarget {
    pub fn from_menu_id(menu_item_id: &str) -> Self {
        if let Some(id) = menu_item_id.strip_prefix(ENGINE_PREFIX) {
            MenuTarget::Engine(id.to_string())
        } else if menu_item_id == OPTIONS_ID {
            MenuTarget::Options
        } else {
            MenuTarget::Other
        }
    }
}

/// Menu entries for `sorted` items: parent, visible children, trailing
/// separator, options leaf. Empty when no item is visible.
pub fn menu_layout<'a>(sorted: impl IntoIterator<Item = &'a Item>) -> Vec<MenuItemSpec> {
    let children: Vec<MenuItemSpec> = sorted
        .into_iter()
        .filter(|item| item.is_visible_in_menu())
        .map(|item| match item {
            Item::Separator(sep) => child(format!("{SEPARATOR_PREFIX}{}", sep.id), None, MenuItemKind::Separator),
            Item::Search(entry) => child(
                format!("{ENGINE_PREFIX}{}", entry.id),
                Some(entry.name.clone()),
                MenuItemKind::Normal,
            ),
        })
        .collect();

    if children.is_empty() {
        return Vec::new();
    }

    let mut layout = Vec::with_capacity(children.len() + 3);
    layout.push(MenuItemSpec {
        id: PARENT_ID.to_string(),
        parent_id: None,
        title: Some(PARENT_TITLE.to_string()),
        kind: MenuItemKind::Normal,
        contexts: vec![SELECTION_CONTEXT.to_string()],
    });
    layout.extend(children);
    layout.push(child(TRAILING_SEPARATOR_ID.to_string(), None, MenuItemKind::Separator));
    layout.push(child(
        OPTIONS_ID.to_string(),
        Some(OPTIONS_TITLE.to_string()),
        MenuItemKind::Normal,
    ));
    layout
}

fn child(id: String, title: Option<String>, kind: MenuItemKind) -> MenuItemSpec {
    MenuItemSpec {
        id,
        parent_id: Some(PARENT_ID.to_string()),
        title,
        kind,
        contexts: vec![SELECTION_CONTEXT.to_string()],
    }
}

/// Owner of the rebuild-in-progress flag
#[derive(Debug, Default)]
pub struct ContextMenuSync {
    rebuilding: Cell<bool>,
}

/// Clears the flag on every exit path, including early returns and errors
struct RebuildGuard<'a>(&'a Cell<bool>);

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ContextMenuSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.get()
    }

    /// Clear the menu and recreate it from the stored list
    pub async fn rebuild<S: KeyValueStore, M: MenuHost>(
        &self,
        store: &ConfigStore<S>,
        menu: &M,
    ) -> Result<RebuildOutcome> {
        if self.rebuilding.replace(true) {
            debug!("Menu rebuild already in progress, skipping");
            return Ok(RebuildOutcome::Skipped);
        }
        let _guard = RebuildGuard(&self.rebuilding);

        menu.clear().await.context("Failed to clear context menu")?;

        let mut items = store.search_engines().await?;
        items.sort_by_key(Item::order);

        let layout = menu_layout(&items);
        if layout.is_empty() {
            info!("No visible items, context menu left empty");
            return Ok(RebuildOutcome::Empty);
        }

        let mut created = 0;
        let mut failed = 0;
        for spec in layout {
            let id = spec.id.clone();
            match menu.create_item(spec).await {
                Ok(()) => created += 1,
                Err(MenuError::DuplicateId(_)) => {
                    debug!(id = %id, "Menu item already exists");
                }
                Err(e) => {
                    error!(id = %id, error = %e, "Error creating context menu item");
                    failed += 1;
                }
            }
        }

        info!(created, failed, "Context menu rebuilt");
        Ok(RebuildOutcome::Built { created, failed })
    }
}
