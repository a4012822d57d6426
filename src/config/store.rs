//! Durable configuration on top of a host key-value store
//!
//! The item list and the global settings live under two keys. Reads of the
//! item list seed the built-in engines when storage is empty. Writes announce
//! themselves on the event channel once they have completed.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::settings::{default_search_engines, GlobalSettings, SettingsDocument};
use crate::constants::storage::{GLOBAL_SETTINGS, SEARCH_ENGINES};
use crate::events::{EventSender, HostEvent};
use crate::host::KeyValueStore;
use crate::model::Item;

pub struct ConfigStore<S> {
    backend: S,
    notifier: Option<EventSender>,
}

impl<S: KeyValueStore> ConfigStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend, notifier: None }
    }

    /// Announce completed writes as `ListChanged` / `SettingsChanged`
    pub fn with_notifier(mut self, notifier: EventSender) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Seed defaults into empty storage. Returns true when engines were seeded.
    pub async fn initialize_defaults(&self) -> Result<bool> {
        let engines: Option<Vec<Item>> = self.read(SEARCH_ENGINES).await?;
        let global: Option<GlobalSettings> = self.read(GLOBAL_SETTINGS).await?;

        if engines.as_ref().is_none_or(Vec::is_empty) {
            info!("No search engines stored, seeding defaults");
            let document = SettingsDocument {
                search_engines: default_search_engines(),
                global_settings: global.unwrap_or_default(),
            };
            self.replace_all(&document).await?;
            return Ok(true);
        }

        if global.is_none() {
            debug!("No global settings stored, writing defaults");
            self.save_global_settings(&GlobalSettings::default()).await?;
        }
        Ok(false)
    }

    /// Whether any engines are stored, without seeding
    pub async fn has_search_engines(&self) -> Result<bool> {
        let engines: Option<Vec<Item>> = self.read(SEARCH_ENGINES).await?;
        Ok(engines.is_some_and(|engines| !engines.is_empty()))
    }

    pub async fn search_engines(&self) -> Result<Vec<Item>> {
        self.initialize_defaults().await?;
        Ok(self.read(SEARCH_ENGINES).await?.unwrap_or_default())
    }

    pub async fn save_search_engines(&self, items: &[Item]) -> Result<()> {
        self.backend
            .set(vec![(SEARCH_ENGINES.to_string(), to_value(SEARCH_ENGINES, items)?)])
            .await
            .context("Failed to save search engines")?;
        info!(count = items.len(), "Saved search engines");
        self.notify(HostEvent::ListChanged);
        Ok(())
    }

    pub async fn global_settings(&self) -> Result<GlobalSettings> {
        self.initialize_defaults().await?;
        Ok(self.read(GLOBAL_SETTINGS).await?.unwrap_or_default())
    }

    pub async fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()> {
        self.backend
            .set(vec![(GLOBAL_SETTINGS.to_string(), to_value(GLOBAL_SETTINGS, settings)?)])
            .await
            .context("Failed to save global settings")?;
        info!(open_in_new_tab = settings.open_in_new_tab, "Saved global settings");
        self.notify(HostEvent::SettingsChanged);
        Ok(())
    }

    /// Export shape of the current state
    pub async fn all_settings(&self) -> Result<SettingsDocument> {
        self.initialize_defaults().await?;
        Ok(SettingsDocument {
            search_engines: self.read(SEARCH_ENGINES).await?.unwrap_or_default(),
            global_settings: self.read(GLOBAL_SETTINGS).await?.unwrap_or_default(),
        })
    }

    /// Overwrite both keys in one write
    pub async fn replace_all(&self, document: &SettingsDocument) -> Result<()> {
        self.backend
            .set(vec![
                (
                    SEARCH_ENGINES.to_string(),
                    to_value(SEARCH_ENGINES, &document.search_engines)?,
                ),
                (
                    GLOBAL_SETTINGS.to_string(),
                    to_value(GLOBAL_SETTINGS, &document.global_settings)?,
                ),
            ])
            .await
            .context("Failed to save settings")?;
        info!(count = document.search_engines.len(), "Replaced all settings");
        self.notify(HostEvent::ListChanged);
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.backend.get(key).await? else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        let parsed = serde_json::from_value(value).with_context(|| format!("Stored '{key}' is malformed"))?;
        Ok(Some(parsed))
    }

    fn notify(&self, event: HostEvent) {
        if let Some(notifier) = &self.notifier {
            if notifier.send(event).is_err() {
                warn!("Event channel closed, change notification dropped");
            }
        }
    }
}

fn to_value<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).with_context(|| format!("Failed to serialize '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;
    use crate::host::memory::MemoryStorage;
    use crate::model::SearchEntry;
    use serde_json::json;

    fn engine(id: &str, order: i64) -> Item {
        let mut entry = SearchEntry::new(id, id, format!("https://{id}/?q=%s"));
        entry.order = order;
        Item::Search(entry)
    }

    #[tokio::test]
    async fn test_first_read_seeds_defaults() {
        let store = ConfigStore::new(MemoryStorage::new());
        assert!(!store.has_search_engines().await.unwrap());

        let engines = store.search_engines().await.unwrap();
        assert_eq!(engines, default_search_engines());
        assert!(store.has_search_engines().await.unwrap());
        assert_eq!(store.global_settings().await.unwrap(), GlobalSettings::default());
    }

    #[tokio::test]
    async fn test_empty_list_is_reseeded_but_settings_kept() {
        let backend = MemoryStorage::new();
        backend
            .set(vec![
                (SEARCH_ENGINES.into(), json!([])),
                (GLOBAL_SETTINGS.into(), json!({"openInNewTab": false})),
            ])
            .await
            .unwrap();
        let store = ConfigStore::new(backend);

        assert!(store.initialize_defaults().await.unwrap());
        assert_eq!(store.search_engines().await.unwrap().len(), 5);
        assert!(!store.global_settings().await.unwrap().open_in_new_tab);
    }

    #[tokio::test]
    async fn test_missing_global_settings_only_writes_settings() {
        let store = ConfigStore::new(MemoryStorage::new());
        store.save_search_engines(&[engine("a", 0)]).await.unwrap();

        assert!(!store.initialize_defaults().await.unwrap());
        assert_eq!(store.search_engines().await.unwrap(), vec![engine("a", 0)]);
        assert!(store.backend().snapshot().contains_key(GLOBAL_SETTINGS));
    }

    #[tokio::test]
    async fn test_seeded_storage_is_not_rewritten() {
        let store = ConfigStore::new(MemoryStorage::new());
        store.search_engines().await.unwrap();
        let writes = store.backend().write_count();

        store.search_engines().await.unwrap();
        store.global_settings().await.unwrap();
        assert_eq!(store.backend().write_count(), writes);
    }

    #[tokio::test]
    async fn test_writes_emit_change_events() {
        let (tx, mut rx) = events::channel();
        let store = ConfigStore::new(MemoryStorage::new()).with_notifier(tx);

        store.save_search_engines(&[engine("a", 0)]).await.unwrap();
        store
            .save_global_settings(&GlobalSettings { open_in_new_tab: false })
            .await
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), HostEvent::ListChanged);
        assert_eq!(rx.try_recv().unwrap(), HostEvent::SettingsChanged);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_stored_list_is_an_error() {
        let backend = MemoryStorage::new();
        backend
            .set(vec![(SEARCH_ENGINES.into(), json!("not a list"))])
            .await
            .unwrap();
        let store = ConfigStore::new(backend);

        let err = store.search_engines().await.unwrap_err();
        assert!(format!("{err:#}").contains("searchEngines"));
    }

    #[tokio::test]
    async fn test_stored_legacy_items_are_normalized() {
        let backend = MemoryStorage::new();
        backend
            .set(vec![(
                SEARCH_ENGINES.into(),
                json!([{"id": "legacy", "name": "Legacy", "url": "https://l/?q=%s", "order": 0}]),
            )])
            .await
            .unwrap();
        let store = ConfigStore::new(backend);

        let engines = store.search_engines().await.unwrap();
        assert!(matches!(&engines[0], Item::Search(entry) if entry.show_in_context_menu));
    }
}
