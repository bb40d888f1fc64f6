//! Daily light-goal progress.
//!
//! `DayTracker` owns exactly one current [`DailyProgress`] record at a
//! time. Credits accumulate monotonically within a day; the record is
//! frozen and handed back at day rollover, which is idempotent per
//! date key.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One local calendar day of accumulated progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Local calendar day key, `YYYY-MM-DD`.
    pub date_key: String,
    /// Credited light minutes. Non-decreasing within a day.
    pub light_minutes: f64,
    pub steps: u32,
    /// True once `light_minutes >= daily_goal_minutes`, or an override
    /// was consumed.
    pub completed: bool,
    /// True when completion came from a consumable rather than light.
    #[serde(default)]
    pub completed_via_override: bool,
}

impl DailyProgress {
    pub fn new(date_key: impl Into<String>) -> Self {
        Self {
            date_key: date_key.into(),
            light_minutes: 0.0,
            steps: 0,
            completed: false,
            completed_via_override: false,
        }
    }
}

/// Result of a single credit application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditOutcome {
    /// Minutes actually added after the rate multiplier.
    pub credited_minutes: f64,
    /// True exactly when this credit flipped `completed` false -> true.
    pub goal_reached_now: bool,
}

/// Local date key for a timestamp, `YYYY-MM-DD`.
pub fn date_key_for(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Owner of the current day's progress record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayTracker {
    current: DailyProgress,
}

impl DayTracker {
    pub fn new(date_key: impl Into<String>) -> Self {
        Self {
            current: DailyProgress::new(date_key),
        }
    }

    /// Restore from a previously persisted record.
    pub fn from_record(record: DailyProgress) -> Self {
        Self { current: record }
    }

    pub fn current(&self) -> &DailyProgress {
        &self.current
    }

    pub fn date_key(&self) -> &str {
        &self.current.date_key
    }

    /// Apply already-multiplied minutes to today's total.
    ///
    /// `credited_minutes` is the product of elapsed minutes and the
    /// credit rate; the multiplier applies at crediting time, never
    /// retroactively. Negative input is rejected as a no-op.
    pub fn credit_minutes(&mut self, credited_minutes: f64, goal_minutes: f64) -> CreditOutcome {
        if credited_minutes < 0.0 || !credited_minutes.is_finite() {
            warn!(credited_minutes, "rejecting invalid credit delta");
            return CreditOutcome {
                credited_minutes: 0.0,
                goal_reached_now: false,
            };
        }
        let was_completed = self.current.completed;
        self.current.light_minutes += credited_minutes;
        if self.current.light_minutes >= goal_minutes {
            self.current.completed = true;
        }
        CreditOutcome {
            credited_minutes,
            goal_reached_now: !was_completed && self.current.completed,
        }
    }

    pub fn add_steps(&mut self, steps: u32) {
        self.current.steps = self.current.steps.saturating_add(steps);
    }

    /// Mark today complete via a consumed override.
    ///
    /// Returns true when this call performed the flip.
    pub fn force_complete(&mut self) -> bool {
        if self.current.completed {
            return false;
        }
        self.current.completed = true;
        self.current.completed_via_override = true;
        true
    }

    /// Archive the current record and start a fresh one for
    /// `new_date_key`.
    ///
    /// Idempotent: a second call with the same key returns `None`
    /// without touching state, so a double-fired boundary tick cannot
    /// double-archive.
    pub fn rollover(&mut self, new_date_key: &str) -> Option<DailyProgress> {
        if self.current.date_key == new_date_key {
            return None;
        }
        let archived = std::mem::replace(&mut self.current, DailyProgress::new(new_date_key));
        Some(archived)
    }
}
