use chrono::Local;
use clap::Subcommand;
use lumis_core::storage::Database;
use lumis_core::GrantKind;

use crate::common::{handle_events, load_store, save_store};

#[derive(Subcommand)]
pub enum PassesAction {
    /// Print the entitlement balances
    Show,
    /// Grant consumables after a purchase
    Grant {
        /// "flare" or "skip"
        #[arg(long)]
        kind: String,
        #[arg(long, default_value = "1")]
        quantity: u32,
    },
    /// Spend an emergency flare to unlock today
    UseEmergency,
    /// Spend a skip pass (or a free monthly unlock) on today
    UseSkip,
}

pub fn run(action: PassesAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = load_store(&db);
    let now = Local::now();

    match action {
        PassesAction::Show => {
            let ledger = store.ledger();
            println!(
                "{}",
                serde_json::json!({
                    "emergency_flares": ledger.emergency_flares(),
                    "skip_passes": ledger.skip_passes(),
                    "monthly_free_unlocks_remaining": ledger.monthly_free_unlocks_remaining(),
                    "emergency_unlock_used_today": ledger.emergency_unlock_used_today(),
                })
            );
            return Ok(());
        }
        PassesAction::Grant { kind, quantity } => {
            let kind = match kind.as_str() {
                "flare" => GrantKind::EmergencyFlare,
                "skip" => GrantKind::SkipPass,
                other => return Err(format!("unknown grant kind: {other}").into()),
            };
            store.grant(kind, quantity);
            println!("Granted {quantity}");
        }
        PassesAction::UseEmergency => {
            let (outcome, events) = store.consume_emergency_unlock(now);
            handle_events(&store, &events);
            if !outcome.success {
                println!("Emergency unlock unavailable (already used today, or no flares)");
            }
        }
        PassesAction::UseSkip => {
            let (outcome, events) = store.consume_skip_pass(now);
            handle_events(&store, &events);
            if !outcome.success {
                println!("No skip passes or free unlocks remaining");
            }
        }
    }

    save_store(&db, &mut store)?;
    Ok(())
}
