//! Shared CLI plumbing: store persistence and event handling.

use chrono::Local;
use lumis_core::storage::Database;
use lumis_core::tracker::is_milestone;
use lumis_core::{
    Event, LogNotifier, LumisStore, Notifier, NullBridge, ProgressUpdate, ShieldController,
};

/// Load the persisted store, or start fresh.
pub fn load_store(db: &Database) -> LumisStore {
    LumisStore::load(db, Local::now())
}

/// Persist the store, archiving any rolled-over days first.
pub fn save_store(
    db: &Database,
    store: &mut LumisStore,
) -> Result<(), Box<dyn std::error::Error>> {
    store.persist(db)?;
    Ok(())
}

/// React to store events: notifications, then a shield pass.
///
/// Every event is also printed as JSON for scripting, mirroring what
/// a GUI shell would receive from its event subscription.
pub fn handle_events(store: &LumisStore, events: &[Event]) {
    let notifier = LogNotifier;

    for event in events {
        match event {
            Event::GoalCompleted { .. } => notifier.goal_complete(),
            Event::StreakAdvanced { current_streak, .. } => {
                if is_milestone(*current_streak) {
                    notifier.streak_milestone(*current_streak);
                }
            }
            Event::MinutesCredited { indoors, .. } => {
                let policy = store.credit_policy();
                notifier.progress_update(ProgressUpdate {
                    remaining_minutes: store.remaining_minutes(),
                    credit_rate: if *indoors {
                        policy.indoor_multiplier
                    } else {
                        policy.outdoor_multiplier
                    },
                    lux_level: store.session().map(|s| s.last_lux()).unwrap_or(0.0),
                });
            }
            _ => {}
        }
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }

    sync_shield(store);
}

/// Apply the current shield decision through the bridge.
pub fn sync_shield(store: &LumisStore) {
    let mut controller = ShieldController::new(Box::new(NullBridge));
    if let Some(result) = controller.sync_now(store.apps(), store.progress()) {
        let at = chrono::Utc::now();
        let event = if !result.delivered {
            Event::ShieldSyncFailed {
                engage: result.engage,
                at,
            }
        } else if result.engage {
            Event::ShieldEngaged { at }
        } else {
            Event::ShieldReleased { at }
        };
        if let Ok(json) = serde_json::to_string(&event) {
            println!("{json}");
        }
    }
    controller.push_progress(
        store.goal_minutes(),
        store.progress().light_minutes,
        store.streak().current_streak,
    );
}
