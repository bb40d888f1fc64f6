//! The application store.
//!
//! Single owner of the mutable domain state: today's progress, the
//! streak, the entitlement ledger, blocked apps, calibration and goal
//! settings. Every mutation goes through a named transition method
//! that returns the [`Event`]s it produced; subscribers (shield
//! controller, notifier, UI) react to events rather than reading
//! hidden globals. Single-threaded, single-writer; the serialized
//! store round-trips through the kv table between launches.
//!
//! Day rollover is checked at the top of every credit path, so the
//! boundary is crossed before the first credit of a new day no matter
//! which tick fires first. Archived days are buffered in
//! `pending_archive` for the persistence layer to drain.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::apps::{BlockedApp, BlockedApps};
use crate::entitlements::{month_key_for, ConsumeOutcome, EntitlementLedger, GrantKind};
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::Database;
use crate::shield::{decide, ShieldDecision};
use crate::tracker::{
    date_key_for, evaluate_rollover, CalibrationRecord, CreditPolicy, DailyProgress, DayBoundary,
    DayTracker, StreakChange, StreakState, TrackingSession,
};

const STORE_KEY: &str = "lumis_store";

#[derive(Debug, Serialize, Deserialize)]
pub struct LumisStore {
    /// Credited minutes needed to complete a day.
    goal_minutes: f64,
    credit: CreditPolicy,
    premium: bool,
    calibration: CalibrationRecord,
    tracker: DayTracker,
    streak: StreakState,
    ledger: EntitlementLedger,
    apps: BlockedApps,
    /// The active tracking session, if any.
    #[serde(default)]
    session: Option<TrackingSession>,
    /// Days archived by rollover, awaiting persistence.
    #[serde(default)]
    pending_archive: Vec<DailyProgress>,
}

impl LumisStore {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            goal_minutes: 15.0,
            credit: CreditPolicy::default(),
            premium: false,
            calibration: CalibrationRecord::default(),
            tracker: DayTracker::new(date_key_for(now)),
            streak: StreakState::default(),
            ledger: EntitlementLedger::new(month_key_for(now)),
            apps: BlockedApps::default(),
            session: None,
            pending_archive: Vec::new(),
        }
    }

    /// Restore the persisted store from the kv table, or start fresh.
    pub fn load(db: &Database, now: DateTime<Local>) -> Self {
        if let Ok(Some(json)) = db.kv_get(STORE_KEY) {
            if let Ok(store) = serde_json::from_str::<LumisStore>(&json) {
                return store;
            }
        }
        Self::new(now)
    }

    /// Persist the store, archiving any rolled-over days first.
    ///
    /// # Errors
    /// Returns an error when serialization or a database write fails.
    pub fn persist(&mut self, db: &Database) -> Result<(), CoreError> {
        for day in self.take_archives() {
            db.archive_day(&day)
                .map_err(crate::error::StorageError::from)?;
        }
        let json = serde_json::to_string(self)?;
        db.kv_set(STORE_KEY, &json)
            .map_err(crate::error::StorageError::from)?;
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goal_minutes(&self) -> f64 {
        self.goal_minutes
    }

    pub fn premium(&self) -> bool {
        self.premium
    }

    pub fn progress(&self) -> &DailyProgress {
        self.tracker.current()
    }

    pub fn streak(&self) -> StreakState {
        self.streak
    }

    pub fn ledger(&self) -> &EntitlementLedger {
        &self.ledger
    }

    pub fn apps(&self) -> &BlockedApps {
        &self.apps
    }

    pub fn calibration(&self) -> &CalibrationRecord {
        &self.calibration
    }

    pub fn credit_policy(&self) -> &CreditPolicy {
        &self.credit
    }

    pub fn session(&self) -> Option<&TrackingSession> {
        self.session.as_ref()
    }

    /// Remaining minutes until today's goal.
    pub fn remaining_minutes(&self) -> f64 {
        (self.goal_minutes - self.tracker.current().light_minutes).max(0.0)
    }

    /// The current logical shield decision.
    pub fn shield_decision(&self) -> ShieldDecision {
        decide(&self.apps, self.tracker.current())
    }

    /// Full state snapshot for UI consumers.
    pub fn snapshot(&self) -> Event {
        let p = self.tracker.current();
        Event::StateSnapshot {
            date_key: p.date_key.clone(),
            light_minutes: p.light_minutes,
            daily_goal_minutes: self.goal_minutes,
            steps: p.steps,
            completed: p.completed,
            current_streak: self.streak.current_streak,
            longest_streak: self.streak.longest_streak,
            shield_engaged: self.shield_decision().engage,
            at: Utc::now(),
        }
    }

    /// Drain days archived since the last drain, for persistence.
    pub fn take_archives(&mut self) -> Vec<DailyProgress> {
        std::mem::take(&mut self.pending_archive)
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn set_goal_minutes(&mut self, minutes: f64) -> Result<(), ValidationError> {
        if minutes <= 0.0 || !minutes.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "daily_goal_minutes".into(),
                message: "goal must be a positive number of minutes".into(),
            });
        }
        self.goal_minutes = minutes;
        // A lowered goal can complete today retroactively; re-check.
        self.tracker.credit_minutes(0.0, self.goal_minutes);
        Ok(())
    }

    pub fn set_premium(&mut self, premium: bool) {
        self.premium = premium;
    }

    pub fn set_credit_policy(&mut self, policy: CreditPolicy) {
        self.credit = policy;
    }

    pub fn set_calibration(&mut self, record: CalibrationRecord) {
        self.calibration = record;
    }

    /// Replace the streak wholesale from a sync pull.
    pub fn restore_streak(&mut self, streak: StreakState) {
        self.streak = streak;
    }

    // ── Day rollover ─────────────────────────────────────────────────

    /// Roll over to `now`'s local day if it changed.
    ///
    /// Archives the frozen day, evaluates the streak on it exactly
    /// once, clears the daily emergency gate and, on a month change,
    /// restores the free unlock allotment. Idempotent per date key.
    pub fn rollover_if_due(&mut self, now: DateTime<Local>) -> Vec<Event> {
        let boundary = DayBoundary::new(self.tracker.date_key());
        let new_key = match boundary.check(now) {
            Some(key) => key,
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        if let Some(archived) = self.tracker.rollover(&new_key) {
            let at = Utc::now();
            events.push(Event::DayRolledOver {
                previous_date_key: archived.date_key.clone(),
                new_date_key: new_key.clone(),
                previous_completed: archived.completed,
                at,
            });

            let (streak, change) = evaluate_rollover(&archived, self.streak);
            self.streak = streak;
            match change {
                StreakChange::Advanced => events.push(Event::StreakAdvanced {
                    current_streak: streak.current_streak,
                    longest_streak: streak.longest_streak,
                    at,
                }),
                StreakChange::Broken { previous_streak } => {
                    events.push(Event::StreakBroken {
                        previous_streak,
                        at,
                    })
                }
            }

            // A boundary that jumps more than one day means at least
            // one calendar day passed with no record at all; those
            // days were not completed, so the streak breaks.
            if day_gap(&archived.date_key, &new_key) > 1 && self.streak.current_streak > 0 {
                let previous_streak = self.streak.current_streak;
                self.streak.current_streak = 0;
                events.push(Event::StreakBroken {
                    previous_streak,
                    at,
                });
            }

            self.ledger.reset_daily_gate();
            self.ledger.reset_monthly_if_due(&month_key_for(now));
            self.pending_archive.push(archived);
            info!(
                %new_key,
                streak = self.streak.current_streak,
                "day rolled over"
            );
        }
        events
    }

    // ── Crediting ────────────────────────────────────────────────────

    /// Credit raw elapsed minutes at the indoor or outdoor rate.
    ///
    /// The multiplier applies to this delta only, never retroactively.
    /// Negative deltas are rejected inside the tracker as a no-op.
    pub fn credit_minutes(
        &mut self,
        delta_minutes: f64,
        indoors: bool,
        now: DateTime<Local>,
    ) -> Vec<Event> {
        let mut events = self.rollover_if_due(now);

        let rate = if indoors {
            self.credit.indoor_multiplier
        } else {
            self.credit.outdoor_multiplier
        };
        let outcome = self
            .tracker
            .credit_minutes(delta_minutes * rate, self.goal_minutes);
        if outcome.credited_minutes > 0.0 {
            let p = self.tracker.current();
            events.push(Event::MinutesCredited {
                date_key: p.date_key.clone(),
                credited_minutes: outcome.credited_minutes,
                light_minutes: p.light_minutes,
                indoors,
                at: Utc::now(),
            });
        }
        if outcome.goal_reached_now {
            events.push(self.goal_completed_event(false));
        }
        events
    }

    pub fn add_steps(&mut self, steps: u32) {
        self.tracker.add_steps(steps);
    }

    // ── Tracking session ─────────────────────────────────────────────

    /// Begin a tracking session, ending any previous one first.
    pub fn start_session(&mut self, now: DateTime<Local>, now_ms: u64) -> Vec<Event> {
        let mut events = self.rollover_if_due(now);
        if self.session.is_some() {
            events.extend(self.end_session());
        }
        let mut session = TrackingSession::new();
        session.start(now_ms);
        events.push(Event::SessionStarted {
            session_id: session.id().to_string(),
            at: Utc::now(),
        });
        self.session = Some(session);
        events
    }

    /// Feed one sensor reading into the active session.
    pub fn ingest_sample(&mut self, lux: f64, now: DateTime<Local>, now_ms: u64) -> Vec<Event> {
        let mut events = self.rollover_if_due(now);

        let credit = match self.session.as_mut() {
            Some(session) => session.ingest_sample(lux, now_ms, &self.calibration, &self.credit),
            None => None,
        };
        if let Some(credit) = credit {
            let outcome = self
                .tracker
                .credit_minutes(credit.credited_minutes, self.goal_minutes);
            let p = self.tracker.current();
            events.push(Event::MinutesCredited {
                date_key: p.date_key.clone(),
                credited_minutes: credit.credited_minutes,
                light_minutes: p.light_minutes,
                indoors: credit.environment == crate::tracker::LightEnvironment::Indoor,
                at: Utc::now(),
            });
            if outcome.goal_reached_now {
                events.push(self.goal_completed_event(false));
            }
        }
        events
    }

    /// End the active session. The session object is dropped, so a
    /// listener that outlives the screen cannot keep crediting.
    pub fn end_session(&mut self) -> Vec<Event> {
        match self.session.take() {
            Some(mut session) => {
                let credited = session.end();
                vec![Event::SessionEnded {
                    session_id: session.id().to_string(),
                    credited_minutes: credited,
                    at: Utc::now(),
                }]
            }
            None => Vec::new(),
        }
    }

    // ── Entitlements ─────────────────────────────────────────────────

    pub fn grant(&mut self, kind: GrantKind, quantity: u32) {
        self.ledger.grant(kind, quantity);
    }

    /// Spend an emergency flare to force today's completion.
    pub fn consume_emergency_unlock(
        &mut self,
        now: DateTime<Local>,
    ) -> (ConsumeOutcome, Vec<Event>) {
        let mut events = self.rollover_if_due(now);
        let outcome = self.ledger.consume_emergency_unlock();
        events.extend(self.apply_override(outcome));
        (outcome, events)
    }

    /// Spend a skip pass (purchased first, then monthly free).
    pub fn consume_skip_pass(&mut self, now: DateTime<Local>) -> (ConsumeOutcome, Vec<Event>) {
        let mut events = self.rollover_if_due(now);
        let outcome = self.ledger.consume_skip_pass();
        events.extend(self.apply_override(outcome));
        (outcome, events)
    }

    fn apply_override(&mut self, outcome: ConsumeOutcome) -> Vec<Event> {
        let source = match (outcome.success, outcome.source) {
            (true, Some(source)) => source,
            _ => return Vec::new(),
        };
        let mut events = vec![Event::OverrideConsumed {
            source,
            at: Utc::now(),
        }];
        if self.tracker.force_complete() {
            events.push(self.goal_completed_event(true));
        }
        events
    }

    // ── Blocked apps ─────────────────────────────────────────────────

    pub fn upsert_app(&mut self, app: BlockedApp) {
        self.apps.upsert(app);
    }

    pub fn remove_app(&mut self, id: &str) -> bool {
        self.apps.remove(id)
    }

    pub fn set_app_blocked(&mut self, id: &str, blocked: bool) -> Result<(), ValidationError> {
        self.apps.set_blocked(id, blocked, self.premium)
    }

    fn goal_completed_event(&self, via_override: bool) -> Event {
        let p = self.tracker.current();
        info!(
            date_key = %p.date_key,
            light_minutes = p.light_minutes,
            via_override,
            "daily goal completed"
        );
        Event::GoalCompleted {
            date_key: p.date_key.clone(),
            light_minutes: p.light_minutes,
            via_override,
            at: Utc::now(),
        }
    }
}

/// Whole calendar days between two date keys; 1 for adjacent days.
fn day_gap(from_key: &str, to_key: &str) -> i64 {
    let parse = |key: &str| chrono::NaiveDate::parse_from_str(key, "%Y-%m-%d");
    match (parse(from_key), parse(to_key)) {
        (Ok(from), Ok(to)) => (to - from).num_days(),
        _ => 1,
    }
}
