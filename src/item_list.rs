//! In-memory ordered list of configuration entries
//!
//! Items are kept in ascending `order` at all times. Loading, delete, move
//! and explicit order changes finish with a reindex, and insert appends, so
//! stored orders are always the contiguous range `0..len`.

use tracing::debug;

use crate::model::Item;
use crate::reorder::{compute_insertion_index, DropPosition};

/// Field changes for [`OrderedItemList::update`]; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub url_template: Option<String>,
    pub show_in_context_menu: Option<bool>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedItemList {
    items: Vec<Item>,
}

impl OrderedItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored records. Ties in `order` keep their stored sequence,
    /// then orders are renumbered `0..len`.
    pub fn from_items(mut items: Vec<Item>) -> Self {
        items.sort_by_key(Item::order);
        let mut list = Self { items };
        list.reindex();
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Items ascending by `order`. Each call starts a fresh pass.
    pub fn sorted(&self) -> impl Iterator<Item = &Item> + Clone + '_ {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.sorted().map(|item| item.id().to_string()).collect()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    /// Append with `order = max + 1` (0 for an empty list)
    pub fn insert(&mut self, mut item: Item) -> String {
        let next_order = self.items.iter().map(Item::order).max().map_or(0, |max| max + 1);
        item.set_order(next_order);
        let id = item.id().to_string();
        self.items.push(item);
        id
    }

    /// Remove an item and close the gap. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(id, "delete: no such item");
            return false;
        };
        self.items.remove(index);
        self.reindex();
        true
    }

    /// Merge field changes into an item. Separators only accept `order`; an
    /// explicit order re-sorts and renumbers the list.
    pub fn update(&mut self, id: &str, update: ItemUpdate) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(id, "update: no such item");
            return false;
        };

        let item = &mut self.items[index];
        if let Item::Search(entry) = item {
            if let Some(name) = update.name {
                entry.name = name;
            }
            if let Some(url) = update.url_template {
                entry.url_template = url;
            }
            if let Some(show) = update.show_in_context_menu {
                entry.show_in_context_menu = show;
            }
        }
        if let Some(order) = update.order {
            item.set_order(order);
            self.items.sort_by_key(Item::order);
            self.reindex();
        }
        true
    }

    /// Drop `dragged_id` above or below `target_id`, then reindex
    pub fn move_item(&mut self, dragged_id: &str, target_id: &str, position: DropPosition) -> bool {
        let Some(new_ids) = compute_insertion_index(&self.ids(), dragged_id, target_id, position) else {
            debug!(dragged_id, target_id, "move: nothing to do");
            return false;
        };

        let mut remaining = std::mem::take(&mut self.items);
        for id in &new_ids {
            if let Some(index) = remaining.iter().position(|item| item.id() == id) {
                self.items.push(remaining.swap_remove(index));
            }
        }
        self.reindex();
        true
    }

    /// Show or hide an engine in the context menu. Separators are always shown.
    pub fn toggle_visibility(&mut self, id: &str, show: bool) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(Item::Search(entry)) => {
                entry.show_in_context_menu = show;
                true
            }
            Some(Item::Separator(_)) | None => false,
        }
    }

    /// Assign `0..len` by current position
    pub fn reindex(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_order(index as i64);
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}
