use clap::Subcommand;
use lumis_core::storage::{Config, Database};
use lumis_core::sync::{SyncClient, SyncPayload, UserSettings};

use crate::common::{load_store, save_store};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Authenticate against the backend
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop stored credentials
    Logout,
    /// Push local state to the backend
    Push,
    /// Pull the server copy and apply it locally
    Pull,
    /// Print the authenticated profile
    Profile,
    /// Validate a purchase receipt and apply the premium entitlement
    Validate {
        #[arg(long)]
        receipt: String,
    },
}

fn client(cfg: &Config) -> Result<SyncClient, Box<dyn std::error::Error>> {
    Ok(SyncClient::new(&cfg.sync.base_url)?)
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let rt = tokio::runtime::Runtime::new()?;

    match action {
        SyncAction::Login { email, password } => {
            let client = client(&cfg)?;
            rt.block_on(client.login(&email, &password))?;
            println!("Logged in as {email}");
        }
        SyncAction::Logout => {
            let client = client(&cfg)?;
            client.logout()?;
            println!("Logged out");
        }
        SyncAction::Push => {
            let db = Database::open()?;
            let mut store = load_store(&db);
            save_store(&db, &mut store)?; // flush pending archives first

            let mut progress = db.all_days()?;
            progress.push(store.progress().clone());
            let payload = SyncPayload {
                settings: UserSettings {
                    daily_goal_minutes: store.goal_minutes(),
                    premium: store.premium(),
                },
                streak: store.streak(),
                progress,
            };

            let client = client(&cfg)?;
            rt.block_on(client.push(&payload))?;
            println!("Pushed {} days", payload.progress.len());
        }
        SyncAction::Pull => {
            let db = Database::open()?;
            let mut store = load_store(&db);

            let client = client(&cfg)?;
            let payload = rt.block_on(client.pull())?;

            // Last-write-wins: the server copy replaces local history.
            store.set_goal_minutes(payload.settings.daily_goal_minutes)?;
            store.set_premium(payload.settings.premium);
            store.restore_streak(payload.streak);
            for day in &payload.progress {
                if day.date_key != store.progress().date_key {
                    db.archive_day(day)?;
                }
            }
            save_store(&db, &mut store)?;
            println!("Pulled {} days", payload.progress.len());
        }
        SyncAction::Profile => {
            let client = client(&cfg)?;
            let profile = rt.block_on(client.profile())?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        SyncAction::Validate { receipt } => {
            let client = client(&cfg)?;
            let status = rt.block_on(client.validate_receipt(&receipt))?;
            if status.valid {
                let db = Database::open()?;
                let mut store = load_store(&db);
                store.set_premium(status.premium);
                save_store(&db, &mut store)?;
                println!(
                    "Receipt accepted, premium {}",
                    if status.premium { "active" } else { "inactive" }
                );
            } else {
                println!("Receipt rejected");
            }
        }
    }
    Ok(())
}
