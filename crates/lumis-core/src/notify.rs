//! Notification seam.
//!
//! Notifications are delivered by the platform shell; the core only
//! decides what to send. Every method is fire-and-forget: an
//! implementation logs its own failures and nothing propagates back
//! into domain code.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Live progress numbers for the persistent tracking notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub remaining_minutes: f64,
    /// Current credit multiplier (1.0 outdoor, 0.5 indoor).
    pub credit_rate: f64,
    pub lux_level: f64,
}

/// Platform notification surface.
pub trait Notifier: Send + Sync {
    /// Daily nudge to get outside.
    fn morning_reminder(&self, _time: NaiveTime) {}

    /// Evening warning when the goal is still unmet.
    fn streak_reminder(&self, _time: NaiveTime) {}

    /// The goal was just completed.
    fn goal_complete(&self) {}

    /// The streak reached a milestone length.
    fn streak_milestone(&self, _days: u32) {}

    /// Refresh the ongoing progress notification.
    fn progress_update(&self, _update: ProgressUpdate) {}
}

/// Notifier that writes to the log instead of the OS. Used by the CLI
/// and as the default when no platform shell is attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn morning_reminder(&self, time: NaiveTime) {
        info!(%time, "morning reminder scheduled");
    }

    fn streak_reminder(&self, time: NaiveTime) {
        info!(%time, "streak reminder scheduled");
    }

    fn goal_complete(&self) {
        info!("goal complete");
    }

    fn streak_milestone(&self, days: u32) {
        info!(days, "streak milestone");
    }

    fn progress_update(&self, update: ProgressUpdate) {
        info!(
            remaining = update.remaining_minutes,
            rate = update.credit_rate,
            lux = update.lux_level,
            "progress update"
        );
    }
}
