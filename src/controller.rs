//! Background event loop
//!
//! Owns the store, the host handles and the menu sync, and reacts to one
//! [`HostEvent`] at a time. Every dispatch re-reads the list and the global
//! settings so it never acts on a stale copy.

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::config::ConfigStore;
use crate::dispatch::{dispatch, read_selection, DispatchedSearch};
use crate::events::{EventReceiver, HostEvent};
use crate::host::{KeyValueStore, MenuHost, PageContext, SelectionSource, TabHost};
use crate::menu::{ContextMenuSync, MenuTarget, RebuildOutcome};
use crate::model::Item;
use crate::shortcuts::{entry_for_slot, ShortcutCommand};

/// Whether the loop keeps going after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct BackgroundController<S, M, T, P> {
    store: ConfigStore<S>,
    menu: M,
    tabs: T,
    selection: P,
    sync: ContextMenuSync,
}

impl<S, M, T, P> BackgroundController<S, M, T, P>
where
    S: KeyValueStore,
    M: MenuHost,
    T: TabHost,
    P: SelectionSource,
{
    pub fn new(store: ConfigStore<S>, menu: M, tabs: T, selection: P) -> Self {
        Self {
            store,
            menu,
            tabs,
            selection,
            sync: ContextMenuSync::new(),
        }
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn menu(&self) -> &M {
        &self.menu
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    /// Build the menu on load, seeding defaults into empty storage first
    pub async fn init(&self) -> Result<RebuildOutcome> {
        if !self.store.has_search_engines().await? {
            info!("First run, seeding default engines");
            self.store.initialize_defaults().await?;
        }
        self.sync.rebuild(&self.store, &self.menu).await
    }

    pub async fn handle(&self, event: HostEvent) -> Result<Flow> {
        debug!(?event, "Handling event");
        match event {
            HostEvent::Installed => {
                self.store.initialize_defaults().await?;
                self.sync.rebuild(&self.store, &self.menu).await?;
            }
            HostEvent::Startup | HostEvent::ListChanged => {
                self.sync.rebuild(&self.store, &self.menu).await?;
            }
            HostEvent::SettingsChanged => {}
            HostEvent::CommandInvoked { command, page } => {
                self.run_command(&command, &page).await?;
            }
            HostEvent::MenuClicked {
                menu_item_id,
                selection_text,
            } => {
                self.menu_clicked(&menu_item_id, selection_text.as_deref().unwrap_or_default())
                    .await?;
            }
            HostEvent::Shutdown => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    /// Keyboard command path: slot, fresh list, selection, dispatch
    pub async fn run_command(&self, command: &str, page: &PageContext) -> Result<Option<DispatchedSearch>> {
        let Some(command) = ShortcutCommand::parse(command) else {
            debug!(command, "Not a search shortcut");
            return Ok(None);
        };

        let mut items = self.store.search_engines().await?;
        items.sort_by_key(Item::order);
        let Some(entry) = entry_for_slot(&items, command.slot) else {
            debug!(slot = command.slot, "No engine bound to shortcut");
            return Ok(None);
        };

        let query = read_selection(&self.selection, page).await;
        let settings = self.store.global_settings().await?;
        dispatch(&self.tabs, entry, &query, &settings)
            .await
            .with_context(|| format!("Failed to dispatch {}", command.name()))
    }

    /// Context menu path: the host hands over the selection it captured
    pub async fn menu_clicked(&self, menu_item_id: &str, selection_text: &str) -> Result<Option<DispatchedSearch>> {
        match MenuTarget::from_menu_id(menu_item_id) {
            MenuTarget::Options => {
                self.tabs.open_options_page().await?;
                Ok(None)
            }
            MenuTarget::Other => {
                debug!(menu_item_id, "Click on non-leaf menu entry");
                Ok(None)
            }
            MenuTarget::Engine(id) => {
                let items = self.store.search_engines().await?;
                let Some(entry) = items.iter().filter_map(Item::as_search).find(|entry| entry.id == id) else {
                    debug!(id = %id, "Clicked engine no longer exists");
                    return Ok(None);
                };
                let settings = self.store.global_settings().await?;
                dispatch(&self.tabs, entry, selection_text, &settings).await
            }
        }
    }

    /// Drain events until `Shutdown` or the channel closes
    pub async fn run(&self, mut events: EventReceiver) {
        while let Some(event) = events.recv().await {
            match self.handle(event).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => {
                    info!("Shutdown requested");
                    break;
                }
                Err(e) => error!(error = %format!("{e:#}"), "Failed to handle event"),
            }
        }
    }

    /// Remove the extension's menu entries
    pub async fn teardown(&self) -> Result<()> {
        self.menu.clear().await.context("Failed to clear context menu")?;
        info!("Context menu removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalSettings;
    use crate::dispatch::OpenTarget;
    use crate::events;
    use crate::host::memory::{MemoryStorage, Opened, RecordingMenu, RecordingTabs, StaticSelection};
    use crate::model::{SearchEntry, Separator};
    use serde_json::json;

    type TestController = BackgroundController<MemoryStorage, RecordingMenu, RecordingTabs, StaticSelection>;

    fn controller(selection: &str) -> TestController {
        BackgroundController::new(
            ConfigStore::new(MemoryStorage::new()),
            RecordingMenu::new(),
            RecordingTabs::new(),
            StaticSelection::new(selection),
        )
    }

    fn page() -> PageContext {
        PageContext::with_url("https://example.com/article")
    }

    #[tokio::test]
    async fn test_init_seeds_and_builds_menu() {
        let controller = controller("");
        let outcome = controller.init().await.unwrap();

        assert_eq!(outcome, RebuildOutcome::Built { created: 8, failed: 0 });
        assert_eq!(controller.menu().ids()[1], "search-engine-youtube");
    }

    #[tokio::test]
    async fn test_command_dispatches_slot_engine() {
        let controller = controller("rust lang");
        let result = controller.run_command("search-2", &page()).await.unwrap().unwrap();

        assert_eq!(result.url, "https://www.google.com/search?q=rust%20lang");
        assert_eq!(result.target, OpenTarget::Tab);
        assert_eq!(controller.tabs().opened(), vec![Opened::Tab(result.url)]);
    }

    #[tokio::test]
    async fn test_command_skips_separators_when_mapping_slots() {
        let controller = controller("q");
        let mut first = SearchEntry::new("a", "A", "https://a/?q=%s");
        first.order = 0;
        let mut second = SearchEntry::new("b", "B", "https://b/?q=%s");
        second.order = 2;
        controller
            .store()
            .save_search_engines(&[
                Item::Search(second),
                Item::Separator(Separator { id: "s".into(), order: 1 }),
                Item::Search(first),
            ])
            .await
            .unwrap();

        let result = controller.run_command("search-2", &page()).await.unwrap().unwrap();
        assert_eq!(result.url, "https://b/?q=q");
        assert_eq!(controller.run_command("search-3", &page()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_command_without_selection_opens_nothing() {
        let controller = controller("   ");
        assert_eq!(controller.run_command("search-1", &page()).await.unwrap(), None);
        assert!(controller.tabs().opened().is_empty());
    }

    #[tokio::test]
    async fn test_command_on_restricted_page_opens_nothing() {
        let controller = controller("text");
        let page = PageContext::with_url("chrome://settings");
        assert_eq!(controller.run_command("search-1", &page).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let controller = controller("text");
        assert_eq!(controller.run_command("_execute_action", &page()).await.unwrap(), None);
        assert_eq!(controller.store().backend().write_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_reads_settings_fresh() {
        let controller = controller("q");
        controller
            .store()
            .save_global_settings(&GlobalSettings { open_in_new_tab: false })
            .await
            .unwrap();

        let result = controller.menu_clicked("search-engine-imdb", "q").await.unwrap().unwrap();
        assert_eq!(result.target, OpenTarget::Window);
    }

    #[tokio::test]
    async fn test_menu_click_uses_captured_selection() {
        let controller = controller("ignored");
        controller.menu_clicked("search-engine-duckduckgo", "hello world").await.unwrap();
        assert_eq!(
            controller.tabs().opened(),
            vec![Opened::Tab("https://duckduckgo.com/?q=hello%20world".into())]
        );
    }

    #[tokio::test]
    async fn test_menu_click_options_and_stale_ids() {
        let controller = controller("");
        controller.menu_clicked("search-shortcuts-options", "").await.unwrap();
        assert_eq!(controller.menu_clicked("search-engine-gone", "q").await.unwrap(), None);
        assert_eq!(controller.menu_clicked("search-shortcuts-parent", "q").await.unwrap(), None);
        assert_eq!(controller.tabs().opened(), vec![Opened::OptionsPage]);
    }

    #[tokio::test]
    async fn test_run_survives_failing_events_and_stops_on_shutdown() {
        let controller = controller("");
        controller
            .store()
            .backend()
            .set(vec![("searchEngines".into(), json!(42))])
            .await
            .unwrap();

        let (tx, rx) = events::channel();
        tx.send(HostEvent::ListChanged).unwrap();
        tx.send(HostEvent::MenuClicked {
            menu_item_id: "search-shortcuts-options".into(),
            selection_text: None,
        })
        .unwrap();
        tx.send(HostEvent::Shutdown).unwrap();
        tx.send(HostEvent::MenuClicked {
            menu_item_id: "search-shortcuts-options".into(),
            selection_text: None,
        })
        .unwrap();

        controller.run(rx).await;
        assert_eq!(controller.tabs().opened(), vec![Opened::OptionsPage]);
    }

    #[tokio::test]
    async fn test_store_writes_trigger_rebuild_through_channel() {
        let (tx, mut rx) = events::channel();
        let controller = BackgroundController::new(
            ConfigStore::new(MemoryStorage::new()).with_notifier(tx),
            RecordingMenu::new(),
            RecordingTabs::new(),
            StaticSelection::unreadable(),
        );
        controller.init().await.unwrap();

        let mut entry = SearchEntry::new("only", "Only", "https://only/?q=%s");
        entry.order = 0;
        controller.store().save_search_engines(&[Item::Search(entry)]).await.unwrap();

        while let Ok(event) = rx.try_recv() {
            controller.handle(event).await.unwrap();
        }
        assert_eq!(controller.menu().ids().len(), 4);
        assert_eq!(controller.menu().ids()[1], "search-engine-only");
    }

    #[tokio::test]
    async fn test_teardown_clears_menu() {
        let controller = controller("");
        controller.init().await.unwrap();
        controller.teardown().await.unwrap();
        assert!(controller.menu().ids().is_empty());
    }
}
