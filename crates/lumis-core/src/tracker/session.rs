//! Active tracking session.
//!
//! A session is a wall-clock state machine with no internal threads:
//! the sensor listener feeds `ingest_sample()` as readings arrive, and
//! the caller owns start/pause/end. Samples are applied in arrival
//! order; an ended session never credits again, so a leaked listener
//! cannot keep accruing minutes after the user navigates away.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active -> (Paused <-> Active) -> Ended
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calibration::{CalibrationRecord, CreditPolicy, LightEnvironment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Active,
    Paused,
    Ended,
}

/// Credit derived from one sensor sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleCredit {
    /// Wall-clock minutes since the previous sample.
    pub elapsed_minutes: f64,
    /// Minutes after the credit-rate multiplier.
    pub credited_minutes: f64,
    pub environment: LightEnvironment,
    pub lux: f64,
}

/// One light-tracking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSession {
    id: String,
    state: SessionState,
    /// Epoch ms of the last accepted sample; credit baseline.
    last_sample_epoch_ms: Option<u64>,
    /// Total credited minutes across the session (post-multiplier).
    credited_minutes: f64,
    samples_seen: u64,
    last_lux: f64,
    /// Gaps longer than this are treated as a sensor interruption:
    /// the hole is not credited and the baseline resets.
    max_sample_gap_ms: u64,
}

const DEFAULT_MAX_SAMPLE_GAP_MS: u64 = 60_000;

impl TrackingSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: SessionState::Idle,
            last_sample_epoch_ms: None,
            credited_minutes: 0.0,
            samples_seen: 0,
            last_lux: 0.0,
            max_sample_gap_ms: DEFAULT_MAX_SAMPLE_GAP_MS,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn credited_minutes(&self) -> f64 {
        self.credited_minutes
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn last_lux(&self) -> f64 {
        self.last_lux
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) -> bool {
        match self.state {
            SessionState::Idle => {
                self.state = SessionState::Active;
                self.last_sample_epoch_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        match self.state {
            SessionState::Active => {
                self.state = SessionState::Paused;
                self.last_sample_epoch_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        match self.state {
            SessionState::Paused => {
                self.state = SessionState::Active;
                self.last_sample_epoch_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }

    /// End the session. Returns the session's total credited minutes.
    /// Terminal: every later command and sample is ignored.
    pub fn end(&mut self) -> f64 {
        self.state = SessionState::Ended;
        self.last_sample_epoch_ms = None;
        self.credited_minutes
    }

    /// Apply one sensor reading.
    ///
    /// Credits the wall-clock interval since the previous sample at
    /// the rate chosen by classifying this sample's lux. Returns
    /// `None` outside the Active state, on the first sample after
    /// (re)start, or when the gap exceeds the interruption threshold.
    pub fn ingest_sample(
        &mut self,
        lux: f64,
        now_ms: u64,
        calibration: &CalibrationRecord,
        policy: &CreditPolicy,
    ) -> Option<SampleCredit> {
        if self.state != SessionState::Active {
            return None;
        }
        self.samples_seen += 1;
        self.last_lux = lux;

        let last = match self.last_sample_epoch_ms.replace(now_ms) {
            Some(last) => last,
            None => return None,
        };
        let gap_ms = now_ms.saturating_sub(last);
        if gap_ms == 0 || gap_ms > self.max_sample_gap_ms {
            return None;
        }

        let environment = calibration.classify(lux, policy);
        let elapsed_minutes = gap_ms as f64 / 60_000.0;
        let credited_minutes = elapsed_minutes * policy.multiplier(environment);
        self.credited_minutes += credited_minutes;

        Some(SampleCredit {
            elapsed_minutes,
            credited_minutes,
            environment,
            lux,
        })
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (CalibrationRecord, CreditPolicy) {
        (CalibrationRecord::default(), CreditPolicy::default())
    }

    #[test]
    fn lifecycle_transitions() {
        let mut session = TrackingSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.start(1_000));
        assert!(!session.start(2_000));
        assert!(session.pause());
        assert!(session.resume(3_000));
        session.end();
        assert_eq!(session.state(), SessionState::Ended);
        assert!(!session.resume(4_000));
    }

    #[test]
    fn outdoor_samples_credit_at_full_rate() {
        let (cal, policy) = fixtures();
        let mut session = TrackingSession::new();
        session.start(0);

        // First sample only sets the baseline.
        assert!(session.ingest_sample(5000.0, 0, &cal, &policy).is_none());

        let credit = session
            .ingest_sample(5000.0, 30_000, &cal, &policy)
            .expect("second sample credits the interval");
        assert_eq!(credit.environment, LightEnvironment::Outdoor);
        assert!((credit.credited_minutes - 0.5).abs() < 1e-9);
    }

    #[test]
    fn indoor_samples_credit_at_half_rate() {
        let (cal, policy) = fixtures();
        let mut session = TrackingSession::new();
        session.start(0);
        session.ingest_sample(200.0, 0, &cal, &policy);

        let credit = session
            .ingest_sample(200.0, 60_000, &cal, &policy)
            .expect("credit");
        assert_eq!(credit.environment, LightEnvironment::Indoor);
        assert!((credit.credited_minutes - 0.5).abs() < 1e-9);
        assert!((credit.elapsed_minutes - 1.0).abs() < 1e-9);
    }

    #[test]
    fn interrupted_stream_does_not_credit_the_hole() {
        let (cal, policy) = fixtures();
        let mut session = TrackingSession::new();
        session.start(0);
        session.ingest_sample(5000.0, 0, &cal, &policy);

        // Five minutes of silence: baseline resets, nothing credited.
        assert!(session.ingest_sample(5000.0, 300_000, &cal, &policy).is_none());
        assert_eq!(session.credited_minutes(), 0.0);

        // Stream resumed; the next interval credits normally.
        let credit = session.ingest_sample(5000.0, 330_000, &cal, &policy).unwrap();
        assert!((credit.credited_minutes - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ended_session_never_credits_again() {
        let (cal, policy) = fixtures();
        let mut session = TrackingSession::new();
        session.start(0);
        session.ingest_sample(5000.0, 0, &cal, &policy);
        session.ingest_sample(5000.0, 30_000, &cal, &policy);
        let total = session.end();
        assert!(total > 0.0);

        assert!(session.ingest_sample(5000.0, 60_000, &cal, &policy).is_none());
        assert_eq!(session.credited_minutes(), total);
    }

    #[test]
    fn paused_session_ignores_samples() {
        let (cal, policy) = fixtures();
        let mut session = TrackingSession::new();
        session.start(0);
        session.ingest_sample(5000.0, 0, &cal, &policy);
        session.pause();
        assert!(session.ingest_sample(5000.0, 30_000, &cal, &policy).is_none());

        // Resume resets the baseline; the paused interval is not credited.
        session.resume(120_000);
        assert!(session.ingest_sample(5000.0, 120_000, &cal, &policy).is_none());
        let credit = session.ingest_sample(5000.0, 150_000, &cal, &policy).unwrap();
        assert!((credit.credited_minutes - 0.5).abs() < 1e-9);
    }
}
