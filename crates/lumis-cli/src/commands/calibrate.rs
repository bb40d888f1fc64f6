use clap::Subcommand;
use lumis_core::storage::Database;
use lumis_core::CalibrationRecord;

use crate::common::{load_store, save_store};

#[derive(Subcommand)]
pub enum CalibrateAction {
    /// Print the stored calibration
    Show,
    /// Store fresh indoor/outdoor baselines
    Set {
        /// Baseline reading taken indoors, away from windows
        #[arg(long)]
        indoor: f64,
        /// Baseline reading taken outdoors
        #[arg(long)]
        outdoor: f64,
    },
    /// Replace calibration with the defaults
    Reset,
}

pub fn run(action: CalibrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = load_store(&db);

    match action {
        CalibrateAction::Show => {
            println!("{}", serde_json::to_string_pretty(store.calibration())?);
            return Ok(());
        }
        CalibrateAction::Set { indoor, outdoor } => {
            let record = CalibrationRecord::calibrate(indoor, outdoor)?;
            store.set_calibration(record);
            println!("Calibrated: indoor {indoor} lux, outdoor {outdoor} lux");
        }
        CalibrateAction::Reset => {
            store.set_calibration(CalibrationRecord::default());
            println!("Calibration reset to defaults");
        }
    }

    save_store(&db, &mut store)?;
    Ok(())
}
