use clap::Subcommand;
use lumis_core::storage::Database;
use lumis_core::{BlockedApp, NullBridge, ShieldBridge};

use crate::common::{load_store, save_store, sync_shield};

#[derive(Subcommand)]
pub enum AppsAction {
    /// List selected apps
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add an app to the selection
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Treat as a whole app category
        #[arg(long)]
        category: bool,
    },
    /// Remove an app from the selection
    Remove {
        #[arg(long)]
        id: String,
    },
    /// Block an app (subject to the free-tier cap)
    Block {
        #[arg(long)]
        id: String,
    },
    /// Unblock an app
    Unblock {
        #[arg(long)]
        id: String,
    },
    /// Import the selection from the platform picker
    Import,
}

pub fn run(action: AppsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = load_store(&db);

    match action {
        AppsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.apps().all())?);
            } else {
                for app in store.apps().all() {
                    let mark = if app.is_blocked { "x" } else { " " };
                    println!("[{mark}] {} ({})", app.name, app.id);
                }
            }
            return Ok(());
        }
        AppsAction::Add { id, name, category } => {
            store.upsert_app(BlockedApp {
                id: id.clone(),
                name,
                icon: String::new(),
                is_blocked: false,
                token_data: None,
                is_category: category,
            });
            println!("Added {id}");
        }
        AppsAction::Remove { id } => {
            if store.remove_app(&id) {
                println!("Removed {id}");
            } else {
                println!("No such app: {id}");
            }
        }
        AppsAction::Block { id } => {
            store.set_app_blocked(&id, true)?;
            sync_shield(&store);
            println!("Blocked {id}");
        }
        AppsAction::Unblock { id } => {
            store.set_app_blocked(&id, false)?;
            sync_shield(&store);
            println!("Unblocked {id}");
        }
        AppsAction::Import => {
            let bridge = NullBridge;
            bridge.show_app_picker();
            let toggles = bridge.app_toggles();
            if toggles.is_empty() {
                println!("No apps reported by the platform");
            } else {
                let count = toggles.len();
                for app in toggles {
                    store.upsert_app(app);
                }
                sync_shield(&store);
                println!("Imported {count} apps");
            }
        }
    }

    save_store(&db, &mut store)?;
    Ok(())
}
