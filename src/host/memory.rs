//! In-process hosts: tests and the CLI menu preview run against these

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{KeyValueStore, MenuError, MenuHost, MenuItemKind, MenuItemSpec, PageContext, SelectionSource, TabHost};

/// Key-value store held in memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, Value>>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.entries.borrow().clone()
    }
}

impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut map = self.entries.borrow_mut();
        for (key, value) in entries {
            map.insert(key, value);
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Menu host that records the tree it is asked to build.
///
/// Creating an id that already exists fails with `DuplicateId`, like the
/// browser API. Every call yields once so concurrent callers interleave.
#[derive(Debug, Default)]
pub struct RecordingMenu {
    items: RefCell<Vec<MenuItemSpec>>,
    clears: Cell<usize>,
    create_calls: Cell<usize>,
    failures: RefCell<HashMap<String, MenuError>>,
}

impl RecordingMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next creation of `id` fail with `error`
    pub fn fail_on(&self, id: impl Into<String>, error: MenuError) {
        self.failures.borrow_mut().insert(id.into(), error);
    }

    pub fn items(&self) -> Vec<MenuItemSpec> {
        self.items.borrow().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.borrow().iter().map(|item| item.id.clone()).collect()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.get()
    }

    /// Indented text rendering of the current tree
    pub fn render(&self) -> String {
        let items = self.items.borrow();
        let mut out = String::new();
        for item in items.iter() {
            let indent = if item.parent_id.is_some() { "  " } else { "" };
            let label = match item.kind {
                MenuItemKind::Separator => "----------".to_string(),
                MenuItemKind::Normal => item.title.clone().unwrap_or_default(),
            };
            out.push_str(&format!("{indent}{label}  [{}]\n", item.id));
        }
        out
    }
}

impl MenuHost for RecordingMenu {
    async fn clear(&self) -> Result<(), MenuError> {
        tokio::task::yield_now().await;
        self.items.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
        Ok(())
    }

    async fn create_item(&self, spec: MenuItemSpec) -> Result<(), MenuError> {
        tokio::task::yield_now().await;
        self.create_calls.set(self.create_calls.get() + 1);

        if let Some(error) = self.failures.borrow_mut().remove(&spec.id) {
            return Err(error);
        }
        if self.items.borrow().iter().any(|item| item.id == spec.id) {
            return Err(MenuError::DuplicateId(spec.id));
        }
        self.items.borrow_mut().push(spec);
        Ok(())
    }
}

/// Where [`RecordingTabs`] was asked to open something
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    Tab(String),
    Window(String),
    OptionsPage,
}

#[derive(Debug, Default)]
pub struct RecordingTabs {
    opened: RefCell<Vec<Opened>>,
}

impl RecordingTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<Opened> {
        self.opened.borrow().clone()
    }
}

impl TabHost for RecordingTabs {
    async fn open_tab(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(Opened::Tab(url.to_string()));
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(Opened::Window(url.to_string()));
        Ok(())
    }

    async fn open_options_page(&self) -> Result<()> {
        self.opened.borrow_mut().push(Opened::OptionsPage);
        Ok(())
    }
}

/// Selection source with a fixed answer; `None` behaves like an unreadable page
#[derive(Debug, Clone, Default)]
pub struct StaticSelection {
    text: Option<String>,
    asked: Cell<usize>,
}

impl StaticSelection {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            asked: Cell::new(0),
        }
    }

    pub fn unreadable() -> Self {
        Self::default()
    }

    /// How many times the host was queried
    pub fn asked(&self) -> usize {
        self.asked.get()
    }
}

impl SelectionSource for StaticSelection {
    async fn selected_text(&self, _page: &PageContext) -> Result<String> {
        self.asked.set(self.asked.get() + 1);
        self.text.clone().ok_or_else(|| anyhow!("cannot access page contents"))
    }
}
