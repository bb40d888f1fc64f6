use chrono::Local;
use clap::Subcommand;
use lumis_core::storage::Database;

use crate::common::{handle_events, load_store, save_store};

#[derive(Subcommand)]
pub enum TrackAction {
    /// Start a tracking session
    Start,
    /// Feed one lux sample into the active session
    Sample {
        /// Ambient light level in lux
        #[arg(long)]
        lux: f64,
    },
    /// Credit elapsed minutes directly (manual entry)
    Credit {
        /// Raw elapsed minutes
        #[arg(long)]
        minutes: f64,
        /// Apply the indoor rate instead of the outdoor one
        #[arg(long)]
        indoors: bool,
    },
    /// Record steps against today
    Steps {
        #[arg(long)]
        count: u32,
    },
    /// End the active session
    End,
    /// Print current progress as JSON
    Status,
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn run(action: TrackAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = load_store(&db);
    let now = Local::now();

    match action {
        TrackAction::Start => {
            let events = store.start_session(now, now_ms());
            handle_events(&store, &events);
        }
        TrackAction::Sample { lux } => {
            let events = store.ingest_sample(lux, now, now_ms());
            handle_events(&store, &events);
        }
        TrackAction::Credit { minutes, indoors } => {
            let events = store.credit_minutes(minutes, indoors, now);
            handle_events(&store, &events);
        }
        TrackAction::Steps { count } => {
            let events = store.rollover_if_due(now);
            handle_events(&store, &events);
            store.add_steps(count);
        }
        TrackAction::End => {
            let events = store.end_session();
            handle_events(&store, &events);
        }
        TrackAction::Status => {
            let events = store.rollover_if_due(now);
            handle_events(&store, &events);
            let snapshot = store.snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    save_store(&db, &mut store)?;
    Ok(())
}
