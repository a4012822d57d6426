#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use tracing::{error, info, warn};

use search_shortcuts::config::ConfigStore;
use search_shortcuts::constants::menu::ENGINE_PREFIX;
use search_shortcuts::controller::BackgroundController;
use search_shortcuts::dispatch::DispatchedSearch;
use search_shortcuts::events::{self, EventSender, HostEvent};
use search_shortcuts::host::desktop::{ArgumentSelection, DesktopTabs, JsonFileStorage};
use search_shortcuts::host::memory::RecordingMenu;
use search_shortcuts::host::PageContext;
use search_shortcuts::logging;
use search_shortcuts::menu::{ContextMenuSync, RebuildOutcome};
use search_shortcuts::model::{EngineDraft, Item};
use search_shortcuts::reorder::DropPosition;
use search_shortcuts::session::OptionsSession;
use search_shortcuts::shortcuts::{self, Platform, ShortcutCommand};
use search_shortcuts::transfer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage file (default: <config dir>/search-shortcuts/storage.json)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// trace, debug, info, warn or error (overrides LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Options(OptionsCommand),
    /// Search with an engine, as if picked from the context menu
    Search {
        id: String,
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Search through a keyboard shortcut slot (1-4)
    Shortcut {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        slot: u8,
        query: Vec<String>,
        /// URL of the page the selection came from
        #[arg(long)]
        page_url: Option<String>,
    },
    /// Process newline-delimited JSON host events from stdin
    Run {
        /// Text reported as the page selection for shortcut commands
        #[arg(long, default_value = "")]
        selection: String,
    },
}

/// Options page operations
#[derive(Subcommand, Debug)]
enum OptionsCommand {
    /// Show engines and separators with their shortcut slots
    List,
    /// Add a search engine; the URL must contain %s
    Add {
        name: String,
        url: String,
        /// Keep it out of the context menu
        #[arg(long)]
        hidden: bool,
    },
    /// Change an engine's name and URL
    Edit {
        id: String,
        name: String,
        url: String,
        /// Context menu visibility (unchanged when omitted)
        #[arg(long)]
        visible: Option<bool>,
    },
    /// Append a separator
    AddSeparator,
    Delete {
        id: String,
    },
    /// Drop an item above or below another one
    Move {
        dragged: String,
        target: String,
        #[arg(long, value_enum, default_value_t = Position::Above)]
        position: Position,
    },
    /// Show an engine in the context menu
    Show {
        id: String,
    },
    /// Hide an engine from the context menu
    Hide {
        id: String,
    },
    /// Where search results open
    OpenIn {
        #[arg(value_enum)]
        target: Target,
    },
    /// Write all settings to a JSON file
    Export {
        /// Defaults to ./search-shortcuts-settings.json
        path: Option<PathBuf>,
    },
    /// Replace all settings with a previously exported file
    Import {
        path: PathBuf,
    },
    /// Print the context menu as it would be built
    Menu,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Position {
    Above,
    Below,
}

impl From<Position> for DropPosition {
    fn from(position: Position) -> Self {
        match position {
            Position::Above => DropPosition::Above,
            Position::Below => DropPosition::Below,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Tab,
    Window,
}

type DesktopController = BackgroundController<JsonFileStorage, RecordingMenu, DesktopTabs, ArgumentSelection>;

fn desktop_controller(store: ConfigStore<JsonFileStorage>, selection: String) -> DesktopController {
    let options_path = store.backend().path().to_path_buf();
    BackgroundController::new(
        store,
        RecordingMenu::new(),
        DesktopTabs::new(options_path),
        ArgumentSelection::new(selection),
    )
}

async fn print_list(session: &mut OptionsSession<'_, JsonFileStorage>) -> Result<()> {
    let mapping = session.shortcut_mapping().await?;
    let platform = Platform::current();

    for item in session.items().await?.sorted() {
        match item {
            Item::Separator(sep) => println!("{:>16}  ----------  [{}]", "", sep.id),
            Item::Search(entry) => {
                let slot = mapping
                    .get(&entry.id)
                    .map(|slot| shortcuts::shortcut_label(*slot, platform))
                    .unwrap_or_default();
                let hidden = if entry.show_in_context_menu { "" } else { " (hidden)" };
                println!("{slot:>16}  {}{hidden}  [{}]  {}", entry.name, entry.id, entry.url_template);
            }
        }
    }
    Ok(())
}

fn report_dispatch(result: Option<DispatchedSearch>) {
    match result {
        Some(search) => println!("Opened {} ({:?})", search.url, search.target),
        None => println!("Nothing to search"),
    }
}

fn report_change(changed: bool, what: &str) {
    if changed {
        println!("{what}");
    } else {
        println!("No change");
    }
}

/// Forward stdin lines to the controller as host events
fn spawn_stdin_listener(sender: EventSender) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        info!("Event listener started on stdin");
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HostEvent>(&line) {
                Ok(event) => {
                    if sender.send(event).is_err() {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, line = %line, "Ignoring malformed event"),
            }
        }
        // EOF ends the session
        let _ = sender.send(HostEvent::Shutdown);
    })
}

async fn run_events(storage: JsonFileStorage, selection: String) -> Result<()> {
    let (tx, rx) = events::channel();
    let store = ConfigStore::new(storage).with_notifier(tx.clone());
    let controller = desktop_controller(store, selection);

    controller.init().await?;
    let _listener = spawn_stdin_listener(tx);
    controller.run(rx).await;
    controller.teardown().await
}

/// Options page operations against the storage file
async fn manage(storage: JsonFileStorage, command: OptionsCommand) -> Result<()> {
    let store = ConfigStore::new(storage);
    let mut session = OptionsSession::new(&store);

    match command {
        OptionsCommand::List => print_list(&mut session).await?,
        OptionsCommand::Add { name, url, hidden } => {
            let mut draft = EngineDraft::new(name, url);
            draft.show_in_context_menu = !hidden;
            let id = session.add_engine(draft).await?;
            println!("Added {id}");
        }
        OptionsCommand::Edit { id, name, url, visible } => {
            let current = session
                .items()
                .await?
                .get(&id)
                .and_then(Item::as_search)
                .map(|entry| entry.show_in_context_menu);
            let mut draft = EngineDraft::new(name, url);
            draft.show_in_context_menu = visible.or(current).unwrap_or(true);
            report_change(session.edit_engine(&id, draft).await?, "Updated");
        }
        OptionsCommand::AddSeparator => {
            let id = session.add_separator().await?;
            println!("Added separator {id}");
        }
        OptionsCommand::Delete { id } => report_change(session.delete(&id).await?, "Deleted"),
        OptionsCommand::Move {
            dragged,
            target,
            position,
        } => report_change(session.move_item(&dragged, &target, position.into()).await?, "Moved"),
        OptionsCommand::Show { id } => report_change(session.set_visibility(&id, true).await?, "Shown"),
        OptionsCommand::Hide { id } => report_change(session.set_visibility(&id, false).await?, "Hidden"),
        OptionsCommand::OpenIn { target } => {
            let new_tab = matches!(target, Target::Tab);
            report_change(session.set_open_in_new_tab(new_tab).await?, "Saved");
        }
        OptionsCommand::Export { path } => {
            let path = match path {
                Some(path) => path,
                None => transfer::default_export_path(
                    &std::env::current_dir().context("Failed to resolve current directory")?,
                ),
            };
            session.export_to_file(&path).await?;
            println!("Exported to {}", path.display());
        }
        OptionsCommand::Import { path } => {
            let count = session.import_from_file(&path).await?;
            println!("Imported {count} items");
        }
        OptionsCommand::Menu => {
            let menu = RecordingMenu::new();
            match ContextMenuSync::new().rebuild(&store, &menu).await? {
                RebuildOutcome::Empty => println!("No visible items, no context menu"),
                _ => print!("{}", menu.render()),
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_level.as_deref())?;

    let storage_path = args.storage.unwrap_or_else(JsonFileStorage::default_path);
    info!(path = %storage_path.display(), "Using storage");
    let storage = JsonFileStorage::new(storage_path);

    match args.command {
        Command::Run { selection } => run_events(storage, selection).await,
        Command::Search { id, query } => {
            let controller = desktop_controller(ConfigStore::new(storage), String::new());
            let menu_item_id = format!("{ENGINE_PREFIX}{id}");
            report_dispatch(controller.menu_clicked(&menu_item_id, &query.join(" ")).await?);
            Ok(())
        }
        Command::Shortcut { slot, query, page_url } => {
            let controller = desktop_controller(ConfigStore::new(storage), query.join(" "));
            let command = ShortcutCommand {
                slot: usize::from(slot - 1),
            };
            let page = page_url.map(PageContext::with_url).unwrap_or_default();
            report_dispatch(controller.run_command(&command.name(), &page).await?);
            Ok(())
        }
        Command::Options(command) => manage(storage, command).await,
    }
}
