use chrono::Local;
use clap::Subcommand;
use lumis_core::storage::Database;
use lumis_core::{decide, NullBridge, ShieldBridge};

use crate::common::{handle_events, load_store, save_store, sync_shield};

#[derive(Subcommand)]
pub enum ShieldAction {
    /// Print the current shield decision
    Status,
    /// Re-evaluate and push the decision to the bridge
    Sync,
    /// Request Screen Time authorization from the OS
    Authorize,
}

pub fn run(action: ShieldAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = load_store(&db);

    match action {
        ShieldAction::Status => {
            let bridge = NullBridge;
            let decision = decide(store.apps(), store.progress());
            println!(
                "{}",
                serde_json::json!({
                    "engage": decision.engage,
                    "enforced": bridge.is_shield_active(),
                    "blocked_apps": store.apps().blocked_count(),
                    "completed": store.progress().completed,
                })
            );
        }
        ShieldAction::Sync => {
            let events = store.rollover_if_due(Local::now());
            handle_events(&store, &events);
            sync_shield(&store);
            save_store(&db, &mut store)?;
        }
        ShieldAction::Authorize => {
            let bridge = NullBridge;
            if bridge.request_authorization() {
                println!("Authorization granted");
            } else {
                println!("Authorization not granted");
            }
        }
    }
    Ok(())
}
