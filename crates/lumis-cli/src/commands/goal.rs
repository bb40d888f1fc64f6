use clap::Subcommand;
use lumis_core::storage::Database;

use crate::common::{load_store, save_store};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Print the daily goal
    Show,
    /// Set the daily goal in credited minutes
    Set {
        #[arg(long)]
        minutes: f64,
    },
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = load_store(&db);

    match action {
        GoalAction::Show => {
            println!(
                "{}",
                serde_json::json!({
                    "daily_goal_minutes": store.goal_minutes(),
                    "light_minutes": store.progress().light_minutes,
                    "remaining_minutes": store.remaining_minutes(),
                    "completed": store.progress().completed,
                })
            );
        }
        GoalAction::Set { minutes } => {
            store.set_goal_minutes(minutes)?;
            save_store(&db, &mut store)?;
            println!("Daily goal set to {minutes} minutes");
        }
    }
    Ok(())
}
