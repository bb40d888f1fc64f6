//! Day-boundary detection.
//!
//! Rollover is driven by an explicit tick (a timer or an
//! app-foreground hook) rather than inferred on every access. The
//! guard compares local date keys, so a tick that fires twice, late,
//! or not at all is safe: the idempotent rollover in
//! [`super::progress::DayTracker`] runs at most once per key.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use super::progress::date_key_for;

/// Tracks the date key the store last rolled over to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBoundary {
    date_key: String,
}

impl DayBoundary {
    pub fn new(date_key: impl Into<String>) -> Self {
        Self {
            date_key: date_key.into(),
        }
    }

    pub fn date_key(&self) -> &str {
        &self.date_key
    }

    /// Returns the new date key when `now` falls on a later local day
    /// than the stored key, `None` otherwise.
    pub fn check(&self, now: DateTime<Local>) -> Option<String> {
        let key = date_key_for(now);
        if key != self.date_key {
            Some(key)
        } else {
            None
        }
    }

    /// Record that rollover to `date_key` happened.
    pub fn advance(&mut self, date_key: impl Into<String>) {
        self.date_key = date_key.into();
    }

    /// Milliseconds until the next local midnight, for scheduling the
    /// boundary tick.
    pub fn ms_until_next_midnight(now: DateTime<Local>) -> i64 {
        let tomorrow = (now + Duration::days(1)).date_naive();
        match tomorrow.and_hms_opt(0, 0, 0) {
            Some(midnight) => match midnight.and_local_timezone(Local) {
                chrono::LocalResult::Single(m) | chrono::LocalResult::Ambiguous(m, _) => {
                    (m - now).num_milliseconds().max(0)
                }
                chrono::LocalResult::None => 0,
            },
            None => 0,
        }
    }
}
