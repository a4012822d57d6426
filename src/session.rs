//! Options page use cases
//!
//! A session is opened per UI start. It loads the item list on first use and
//! writes it back after every mutation that actually changed something.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ConfigStore, GlobalSettings};
use crate::host::KeyValueStore;
use crate::item_list::{ItemUpdate, OrderedItemList};
use crate::model::{generate_id, EngineDraft, Item, SearchEntry, Separator};
use crate::reorder::DropPosition;
use crate::shortcuts;
use crate::transfer;

pub struct OptionsSession<'a, S> {
    store: &'a ConfigStore<S>,
    list: Option<OrderedItemList>,
}

impl<'a, S: KeyValueStore> OptionsSession<'a, S> {
    pub fn new(store: &'a ConfigStore<S>) -> Self {
        Self { store, list: None }
    }

    /// Current list, loading (and seeding) it on first access
    pub async fn items(&mut self) -> Result<&OrderedItemList> {
        let list: &OrderedItemList = self.list_mut().await?;
        Ok(list)
    }

    /// Validate and append a new engine. Returns its id.
    pub async fn add_engine(&mut self, draft: EngineDraft) -> Result<String> {
        let draft = draft.validate()?;
        let mut entry = SearchEntry::new(generate_id(), draft.name, draft.url);
        entry.show_in_context_menu = draft.show_in_context_menu;

        let id = self.list_mut().await?.insert(Item::Search(entry));
        self.persist().await?;
        info!(id = %id, "Engine added");
        Ok(id)
    }

    /// Replace an engine's fields. Separators and unknown ids are left alone.
    pub async fn edit_engine(&mut self, id: &str, draft: EngineDraft) -> Result<bool> {
        let draft = draft.validate()?;
        let list = self.list_mut().await?;
        let Some(Item::Search(current)) = list.get(id) else {
            debug!(id, "edit: not an engine");
            return Ok(false);
        };
        if current.name == draft.name
            && current.url_template == draft.url
            && current.show_in_context_menu == draft.show_in_context_menu
        {
            debug!(id, "edit: nothing changed");
            return Ok(false);
        }

        list.update(
            id,
            ItemUpdate {
                name: Some(draft.name),
                url_template: Some(draft.url),
                show_in_context_menu: Some(draft.show_in_context_menu),
                order: None,
            },
        );
        self.persist().await?;
        info!(id, "Engine updated");
        Ok(true)
    }

    pub async fn add_separator(&mut self) -> Result<String> {
        let id = self.list_mut().await?.insert(Item::Separator(Separator::new(generate_id())));
        self.persist().await?;
        info!(id = %id, "Separator added");
        Ok(id)
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        if !self.list_mut().await?.delete(id) {
            return Ok(false);
        }
        self.persist().await?;
        info!(id, "Item deleted");
        Ok(true)
    }

    pub async fn move_item(&mut self, dragged_id: &str, target_id: &str, position: DropPosition) -> Result<bool> {
        if !self.list_mut().await?.move_item(dragged_id, target_id, position) {
            return Ok(false);
        }
        self.persist().await?;
        info!(dragged_id, target_id, ?position, "Item moved");
        Ok(true)
    }

    pub async fn set_visibility(&mut self, id: &str, show: bool) -> Result<bool> {
        let list = self.list_mut().await?;
        match list.get(id) {
            Some(Item::Search(entry)) if entry.show_in_context_menu != show => {}
            _ => {
                debug!(id, show, "visibility: nothing to change");
                return Ok(false);
            }
        }
        list.toggle_visibility(id, show);
        self.persist().await?;
        info!(id, show, "Visibility changed");
        Ok(true)
    }

    pub async fn global_settings(&self) -> Result<GlobalSettings> {
        self.store.global_settings().await
    }

    pub async fn set_open_in_new_tab(&self, open_in_new_tab: bool) -> Result<bool> {
        let mut settings = self.store.global_settings().await?;
        if settings.open_in_new_tab == open_in_new_tab {
            return Ok(false);
        }
        settings.open_in_new_tab = open_in_new_tab;
        self.store.save_global_settings(&settings).await?;
        Ok(true)
    }

    /// Item id → slot for the shortcut badges
    pub async fn shortcut_mapping(&mut self) -> Result<HashMap<String, usize>> {
        Ok(shortcuts::mapping(self.list_mut().await?.sorted()))
    }

    pub async fn slot_hint(&mut self, editing_id: Option<&str>) -> Result<Option<usize>> {
        Ok(shortcuts::slot_hint(self.list_mut().await?.sorted(), editing_id))
    }

    pub async fn export_json(&self) -> Result<String> {
        transfer::export_json(&self.store.all_settings().await?)
    }

    pub async fn export_to_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json().await?;
        transfer::write_export(path, &json)
    }

    /// Replace everything with an imported document. Returns the item count.
    ///
    /// The document is fully parsed before anything is written; on error
    /// storage and the session list are unchanged.
    pub async fn import_json(&mut self, text: &str) -> Result<usize> {
        let document = transfer::parse_import(text)?;
        self.store.replace_all(&document).await?;

        let count = document.search_engines.len();
        self.list = Some(OrderedItemList::from_items(document.search_engines));
        info!(count, "Settings imported");
        Ok(count)
    }

    pub async fn import_from_file(&mut self, path: &Path) -> Result<usize> {
        let text = transfer::read_import(path)?;
        self.import_json(&text).await
    }

    async fn list_mut(&mut self) -> Result<&mut OrderedItemList> {
        let list = match self.list.take() {
            Some(list) => list,
            None => OrderedItemList::from_items(self.store.search_engines().await?),
        };
        Ok(self.list.insert(list))
    }

    async fn persist(&self) -> Result<()> {
        match &self.list {
            Some(list) => self.store.save_search_engines(list.as_slice()).await,
            None => Ok(()),
        }
    }
}
