//! Turning an engine and a query into an opened search page

use anyhow::Result;
use tracing::{debug, info};

use crate::config::GlobalSettings;
use crate::constants::template::PLACEHOLDER;
use crate::host::{PageContext, SelectionSource, TabHost};
use crate::model::SearchEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    Tab,
    Window,
}

impl OpenTarget {
    pub fn from_settings(settings: &GlobalSettings) -> Self {
        if settings.open_in_new_tab {
            OpenTarget::Tab
        } else {
            OpenTarget::Window
        }
    }
}

/// What a successful dispatch opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedSearch {
    pub url: String,
    pub target: OpenTarget,
}

/// Substitute the percent-encoded query for the first `%s`
pub fn build_search_url(template: &str, query: &str) -> String {
    template.replacen(PLACEHOLDER, &urlencoding::encode(query), 1)
}

/// Selected text on `page`, or empty when the page cannot be read
pub async fn read_selection<P: SelectionSource>(source: &P, page: &PageContext) -> String {
    if page.is_restricted() {
        debug!(url = ?page.url, "Restricted page, no selection");
        return String::new();
    }
    match source.selected_text(page).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            debug!(error = %e, url = ?page.url, "Selection unreadable, treating as empty");
            String::new()
        }
    }
}

/// Open `entry` for `query`. An empty query opens nothing.
pub async fn dispatch<T: TabHost>(
    tabs: &T,
    entry: &SearchEntry,
    query: &str,
    settings: &GlobalSettings,
) -> Result<Option<DispatchedSearch>> {
    if query.trim().is_empty() {
        debug!(engine = %entry.id, "Empty query, nothing to dispatch");
        return Ok(None);
    }

    let url = build_search_url(&entry.url_template, query);
    let target = OpenTarget::from_settings(settings);
    match target {
        OpenTarget::Tab => tabs.open_tab(&url).await?,
        OpenTarget::Window => tabs.open_window(&url).await?,
    }

    info!(engine = %entry.id, url = %url, target = ?target, "Dispatched search");
    Ok(Some(DispatchedSearch { url, target }))
}
