use clap::Subcommand;
use lumis_core::storage::Database;

use crate::common::load_store;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate completion statistics
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Recent archived days, newest first
    History {
        #[arg(long, default_value = "14")]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let store = load_store(&db);

    match action {
        StatsAction::Show { json } => {
            let stats = db.stats(store.progress())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Days tracked:    {}", stats.days_tracked);
                println!("Days completed:  {}", stats.days_completed);
                println!("  via override:  {}", stats.days_completed_via_override);
                println!("Total light:     {:.1} min", stats.total_light_min);
                println!("Today:           {:.1} min", stats.today_light_min);
                println!(
                    "Streak:          {} (longest {})",
                    store.streak().current_streak,
                    store.streak().longest_streak
                );
            }
        }
        StatsAction::History { limit } => {
            for day in db.recent_days(limit)? {
                let mark = if day.completed { "done" } else { "miss" };
                println!(
                    "{} {:>6.1} min  {}",
                    day.date_key, day.light_minutes, mark
                );
            }
        }
    }
    Ok(())
}
