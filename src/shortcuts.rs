//! Keyboard shortcut slots
//!
//! The host binds four fixed accelerators (`search-1` .. `search-4`). Slots are
//! handed to the first four search entries in display order; separators never
//! take a slot. Nothing here is cached: callers pass the current list each time.

use std::collections::HashMap;

use crate::constants::shortcuts::{COMMAND_PREFIX, SLOT_COUNT};
use crate::model::{Item, SearchEntry};

/// A host command that maps to a shortcut slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutCommand {
    pub slot: usize,
}

impl ShortcutCommand {
    /// `search-1` .. `search-4` → slots 0..3
    pub fn parse(command: &str) -> Option<Self> {
        let number: usize = command.strip_prefix(COMMAND_PREFIX)?.parse().ok()?;
        (1..=SLOT_COUNT)
            .contains(&number)
            .then(|| Self { slot: number - 1 })
    }

    pub fn name(&self) -> String {
        format!("{COMMAND_PREFIX}{}", self.slot + 1)
    }
}

/// Modifier naming differs between platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    fn alt_name(self) -> &'static str {
        match self {
            Platform::Mac => "Option",
            Platform::Other => "Alt",
        }
    }
}

/// Item id → slot index for the first four search entries
pub fn mapping<'a>(sorted: impl IntoIterator<Item = &'a Item>) -> HashMap<String, usize> {
    search_entries(sorted)
        .take(SLOT_COUNT)
        .enumerate()
        .map(|(slot, entry)| (entry.id.clone(), slot))
        .collect()
}

/// The entry currently bound to `slot`, if any
pub fn entry_for_slot<'a>(sorted: impl IntoIterator<Item = &'a Item>, slot: usize) -> Option<&'a SearchEntry> {
    if slot >= SLOT_COUNT {
        return None;
    }
    search_entries(sorted).nth(slot)
}

/// Slot shown in the edit form: the edited entry's slot, or for a new entry
/// (`editing_id == None`) the slot it would receive when appended
pub fn slot_hint<'a>(sorted: impl IntoIterator<Item = &'a Item>, editing_id: Option<&str>) -> Option<usize> {
    match editing_id {
        Some(id) => search_entries(sorted)
            .position(|entry| entry.id == id)
            .filter(|slot| *slot < SLOT_COUNT),
        None => {
            let count = search_entries(sorted).count();
            (count < SLOT_COUNT).then_some(count)
        }
    }
}

/// Display label such as `Alt+Shift+1`
pub fn shortcut_label(slot: usize, platform: Platform) -> String {
    format!("{}+Shift+{}", platform.alt_name(), slot + 1)
}

fn search_entries<'a>(sorted: impl IntoIterator<Item = &'a Item>) -> impl Iterator<Item = &'a SearchEntry> {
    sorted.into_iter().filter_map(Item::as_search)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Separator;

    fn engine(id: &str) -> Item {
        Item::Search(SearchEntry::new(id, id, format!("https://{id}/?q=%s")))
    }

    fn separator(id: &str) -> Item {
        Item::Separator(Separator::new(id))
    }

    #[test]
    fn test_mapping_skips_separators() {
        let items = vec![separator("s0"), engine("a"), separator("s1"), engine("b")];
        let map = mapping(&items);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&0));
        assert_eq!(map.get("b"), Some(&1));
        assert!(!map.contains_key("s0"));
        assert!(!map.contains_key("s1"));
    }

    #[test]
    fn test_mapping_stops_after_four_entries() {
        let items: Vec<Item> = ["a", "b", "c", "d", "e", "f"].into_iter().map(engine).collect();
        let map = mapping(&items);

        assert_eq!(map.len(), 4);
        assert_eq!(map.get("d"), Some(&3));
        assert_eq!(map.get("e"), None);
    }

    #[test]
    fn test_mapping_empty_list() {
        assert!(mapping(&Vec::<Item>::new()).is_empty());
    }

    #[test]
    fn test_entry_for_slot() {
        let items = vec![engine("a"), separator("s"), engine("b")];
        assert_eq!(entry_for_slot(&items, 1).map(|e| e.id.as_str()), Some("b"));
        assert!(entry_for_slot(&items, 2).is_none());
        assert!(entry_for_slot(&items, 9).is_none());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(ShortcutCommand::parse("search-1"), Some(ShortcutCommand { slot: 0 }));
        assert_eq!(ShortcutCommand::parse("search-4"), Some(ShortcutCommand { slot: 3 }));
        assert_eq!(ShortcutCommand::parse("search-5"), None);
        assert_eq!(ShortcutCommand::parse("search-0"), None);
        assert_eq!(ShortcutCommand::parse("reload"), None);
        assert_eq!(ShortcutCommand { slot: 2 }.name(), "search-3");
    }

    #[test]
    fn test_shortcut_label() {
        assert_eq!(shortcut_label(0, Platform::Other), "Alt+Shift+1");
        assert_eq!(shortcut_label(3, Platform::Mac), "Option+Shift+4");
    }

    #[test]
    fn test_slot_hint() {
        let items = vec![engine("a"), separator("s"), engine("b")];
        assert_eq!(slot_hint(&items, Some("b")), Some(1));
        assert_eq!(slot_hint(&items, Some("s")), None);
        assert_eq!(slot_hint(&items, None), Some(2));

        let full: Vec<Item> = ["a", "b", "c", "d", "e"].into_iter().map(engine).collect();
        assert_eq!(slot_hint(&full, None), None);
        assert_eq!(slot_hint(&full, Some("e")), None);
    }
}
