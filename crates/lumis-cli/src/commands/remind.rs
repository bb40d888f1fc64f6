use chrono::NaiveTime;
use clap::Subcommand;
use lumis_core::storage::{Config, Database};
use lumis_core::{LogNotifier, Notifier};

use crate::common::load_store;

#[derive(Subcommand)]
pub enum RemindAction {
    /// Fire the morning get-outside reminder
    Morning,
    /// Fire the evening streak-at-risk reminder (skipped when today
    /// is already complete)
    Streak,
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    if !cfg.notifications.enabled {
        println!("Notifications disabled");
        return Ok(());
    }
    let notifier = LogNotifier;

    match action {
        RemindAction::Morning => {
            let time = NaiveTime::from_hms_opt(cfg.notifications.morning_reminder_hour as u32, 0, 0)
                .unwrap_or_default();
            notifier.morning_reminder(time);
            println!("Morning reminder sent");
        }
        RemindAction::Streak => {
            let db = Database::open()?;
            let store = load_store(&db);
            if store.progress().completed {
                println!("Goal already met, no reminder needed");
                return Ok(());
            }
            let time = NaiveTime::from_hms_opt(cfg.notifications.streak_reminder_hour as u32, 0, 0)
                .unwrap_or_default();
            notifier.streak_reminder(time);
            println!("Streak reminder sent");
        }
    }
    Ok(())
}
