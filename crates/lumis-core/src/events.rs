use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entitlements::UnlockSource;

/// Every state change in the system produces an Event.
/// The CLI prints them; UI layers poll or subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Light minutes were credited to today's progress.
    MinutesCredited {
        date_key: String,
        credited_minutes: f64,
        light_minutes: f64,
        indoors: bool,
        at: DateTime<Utc>,
    },
    /// Today's goal flipped from not-met to met.
    GoalCompleted {
        date_key: String,
        light_minutes: f64,
        via_override: bool,
        at: DateTime<Utc>,
    },
    /// A new calendar day began; the previous record was archived.
    DayRolledOver {
        previous_date_key: String,
        new_date_key: String,
        previous_completed: bool,
        at: DateTime<Utc>,
    },
    /// The streak advanced after a completed day.
    StreakAdvanced {
        current_streak: u32,
        longest_streak: u32,
        at: DateTime<Utc>,
    },
    /// A day elapsed without completion; the streak reset.
    StreakBroken {
        previous_streak: u32,
        at: DateTime<Utc>,
    },
    /// A consumable was spent to force today's completion.
    OverrideConsumed {
        source: UnlockSource,
        at: DateTime<Utc>,
    },
    /// The shield decision flipped to engaged.
    ShieldEngaged {
        at: DateTime<Utc>,
    },
    /// The shield decision flipped to released.
    ShieldReleased {
        at: DateTime<Utc>,
    },
    /// The native bridge rejected a shield command after retry.
    ShieldSyncFailed {
        engage: bool,
        at: DateTime<Utc>,
    },
    /// A tracking session started.
    SessionStarted {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// A tracking session ended; no further credit may come from it.
    SessionEnded {
        session_id: String,
        credited_minutes: f64,
        at: DateTime<Utc>,
    },
    /// Full state snapshot for UI consumers.
    StateSnapshot {
        date_key: String,
        light_minutes: f64,
        daily_goal_minutes: f64,
        steps: u32,
        completed: bool,
        current_streak: u32,
        longest_streak: u32,
        shield_engaged: bool,
        at: DateTime<Utc>,
    },
}
