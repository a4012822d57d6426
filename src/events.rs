//! Typed host events delivered to the background controller
//!
//! The host (browser shell, CLI, test) pushes events into one channel and a
//! single controller drains it, one event at a time.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::host::PageContext;

/// Events the host fires at the background context
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HostEvent {
    /// Extension installed or updated
    Installed,

    /// Browser session started with the extension already present
    Startup,

    /// The persisted item list was written
    ListChanged,

    /// Only global settings were written
    SettingsChanged,

    /// A keyboard command fired (`search-1` .. `search-4`)
    #[serde(rename_all = "camelCase")]
    CommandInvoked {
        command: String,
        #[serde(default)]
        page: PageContext,
    },

    /// A context menu leaf was clicked
    #[serde(rename_all = "camelCase")]
    MenuClicked {
        menu_item_id: String,
        #[serde(default)]
        selection_text: Option<String>,
    },

    /// Stop the event loop
    Shutdown,
}

pub type EventSender = mpsc::UnboundedSender<HostEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Create the controller's event channel
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_parse_from_json_lines() {
        let event: HostEvent = serde_json::from_str(r#"{"event":"startup"}"#).unwrap();
        assert_eq!(event, HostEvent::Startup);

        let event: HostEvent = serde_json::from_str(
            r#"{"event":"menuClicked","menuItemId":"search-engine-google","selectionText":"rust"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HostEvent::MenuClicked {
                menu_item_id: "search-engine-google".into(),
                selection_text: Some("rust".into()),
            }
        );
    }

    #[test]
    fn test_command_event_without_page_uses_default() {
        let event: HostEvent = serde_json::from_str(r#"{"event":"commandInvoked","command":"search-2"}"#).unwrap();
        match event {
            HostEvent::CommandInvoked { command, page } => {
                assert_eq!(command, "search-2");
                assert_eq!(page, PageContext::default());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (tx, mut rx) = channel();
        tx.send(HostEvent::Installed).unwrap();
        tx.send(HostEvent::ListChanged).unwrap();
        drop(tx);

        assert_eq!(rx.recv().await, Some(HostEvent::Installed));
        assert_eq!(rx.recv().await, Some(HostEvent::ListChanged));
        assert_eq!(rx.recv().await, None);
    }
}
