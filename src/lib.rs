#![forbid(unsafe_code)]

//! Search shortcuts: a user-curated list of search engines reachable from
//! the text-selection context menu and four keyboard shortcuts.

pub mod config;
pub mod constants;
pub mod controller;
pub mod dispatch;
pub mod events;
pub mod host;
pub mod item_list;
pub mod logging;
pub mod menu;
pub mod model;
pub mod reorder;
pub mod session;
pub mod shortcuts;
pub mod transfer;
