//! Streak engine.
//!
//! Pure day-over-day streak evaluation. Called exactly once per day
//! boundary with the just-archived previous day; no clocks, no IO.

use serde::{Deserialize, Serialize};

use super::progress::DailyProgress;

/// Streak milestones that trigger a celebration notification.
const MILESTONES: [u32; 6] = [3, 7, 14, 30, 100, 365];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Outcome of a single rollover evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Previous day completed; streak advanced by one.
    Advanced,
    /// Previous day not completed; streak reset to zero.
    Broken { previous_streak: u32 },
}

/// Evaluate the streak across a day boundary.
///
/// A day completed via a consumed override counts the same as an
/// organically completed day: the engine inspects only the `completed`
/// flag. The very first completed day yields a streak of 1.
pub fn evaluate_rollover(
    previous_day: &DailyProgress,
    streak: StreakState,
) -> (StreakState, StreakChange) {
    if previous_day.completed {
        let current = streak.current_streak.saturating_add(1);
        (
            StreakState {
                current_streak: current,
                longest_streak: streak.longest_streak.max(current),
            },
            StreakChange::Advanced,
        )
    } else {
        (
            StreakState {
                current_streak: 0,
                longest_streak: streak.longest_streak,
            },
            StreakChange::Broken {
                previous_streak: streak.current_streak,
            },
        )
    }
}

/// Whether a streak length is a milestone worth celebrating.
pub fn is_milestone(days: u32) -> bool {
    MILESTONES.contains(&days)
}
