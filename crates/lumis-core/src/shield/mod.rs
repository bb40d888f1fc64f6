//! Shield decision layer.
//!
//! [`decide`] is the pure rule: engage while any app is blocked and
//! today's goal is unmet. [`ShieldController`] turns decision flips
//! into bridge commands, debouncing bursty changes and retrying a
//! failed command once before giving up. The logical state is
//! authoritative either way; enforcement is best-effort.

pub mod bridge;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::apps::BlockedApps;
use crate::tracker::DailyProgress;

pub use bridge::{NullBridge, ShieldBridge};

/// Coalescing window for bridge commands.
const DEFAULT_DEBOUNCE_MS: u64 = 1_000;

/// The logical shield decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldDecision {
    pub engage: bool,
}

/// Pure decision function: engage iff at least one app is blocked and
/// the goal is not met. No hidden state.
pub fn decide(apps: &BlockedApps, progress: &DailyProgress) -> ShieldDecision {
    ShieldDecision {
        engage: apps.any_blocked() && !progress.completed,
    }
}

/// Outcome of one applied bridge command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldCommandResult {
    pub engage: bool,
    /// Whether the bridge acknowledged the command (after retry).
    pub delivered: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingChange {
    engage: bool,
    due_at_ms: u64,
}

/// Drives the native bridge from decision transitions.
pub struct ShieldController {
    bridge: Box<dyn ShieldBridge>,
    /// Last state pushed to the bridge (logical, kept even when the
    /// bridge reported failure).
    applied: Option<bool>,
    pending: Option<PendingChange>,
    debounce_ms: u64,
}

impl ShieldController {
    pub fn new(bridge: Box<dyn ShieldBridge>) -> Self {
        Self::with_debounce(bridge, DEFAULT_DEBOUNCE_MS)
    }

    pub fn with_debounce(bridge: Box<dyn ShieldBridge>, debounce_ms: u64) -> Self {
        Self {
            bridge,
            applied: None,
            pending: None,
            debounce_ms,
        }
    }

    /// The engagement state last pushed toward the bridge.
    pub fn applied(&self) -> Option<bool> {
        self.applied
    }

    pub fn bridge(&self) -> &dyn ShieldBridge {
        self.bridge.as_ref()
    }

    /// Re-evaluate the decision and schedule a bridge command when it
    /// differs from the applied state. Repeated flips inside the
    /// debounce window coalesce into the final target.
    pub fn observe(&mut self, apps: &BlockedApps, progress: &DailyProgress, now_ms: u64) {
        let desired = decide(apps, progress).engage;

        if self.applied == Some(desired) {
            if self.pending.take().is_some() {
                debug!(desired, "shield change churned back, dropping pending command");
            }
            return;
        }
        match self.pending {
            Some(p) if p.engage == desired => {} // already scheduled
            _ => {
                self.pending = Some(PendingChange {
                    engage: desired,
                    due_at_ms: now_ms + self.debounce_ms,
                });
            }
        }
    }

    /// Apply the pending command once its debounce window elapsed.
    pub fn flush(&mut self, now_ms: u64) -> Option<ShieldCommandResult> {
        let pending = self.pending?;
        if now_ms < pending.due_at_ms {
            return None;
        }
        self.pending = None;
        Some(self.apply(pending.engage))
    }

    /// Evaluate and apply immediately, bypassing the debounce. Used at
    /// startup and on explicit user action.
    pub fn sync_now(
        &mut self,
        apps: &BlockedApps,
        progress: &DailyProgress,
    ) -> Option<ShieldCommandResult> {
        let desired = decide(apps, progress).engage;
        self.pending = None;
        if self.applied == Some(desired) {
            return None;
        }
        Some(self.apply(desired))
    }

    /// Push progress numbers for the shield overlay. Informational,
    /// fire-and-forget: a failure is logged, never retried.
    pub fn push_progress(&self, goal_minutes: f64, light_minutes: f64, streak: u32) {
        if !self
            .bridge
            .update_shield_data(goal_minutes, light_minutes, streak)
        {
            warn!(bridge = self.bridge.name(), "shield data update rejected");
        }
    }

    fn apply(&mut self, engage: bool) -> ShieldCommandResult {
        // Logical state is authoritative regardless of delivery.
        self.applied = Some(engage);

        let mut delivered = self.send(engage);
        if !delivered {
            warn!(
                bridge = self.bridge.name(),
                engage, "shield command failed, retrying once"
            );
            delivered = self.send(engage);
            if !delivered {
                warn!(
                    bridge = self.bridge.name(),
                    engage, "shield command failed after retry, giving up"
                );
            }
        }
        ShieldCommandResult { engage, delivered }
    }

    fn send(&self, engage: bool) -> bool {
        if engage {
            self.bridge.activate_shield()
        } else {
            self.bridge.deactivate_shield()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::BlockedApp;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBridge {
        calls: Mutex<Vec<&'static str>>,
        fail_next: AtomicU32,
    }

    impl RecordingBridge {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) -> bool {
            self.calls.lock().unwrap().push(call);
            if self.fail_next.load(Ordering::SeqCst) > 0 {
                self.fail_next.fetch_sub(1, Ordering::SeqCst);
                return false;
            }
            true
        }
    }

    impl ShieldBridge for &'static RecordingBridge {
        fn name(&self) -> &str {
            "recording"
        }
        fn request_authorization(&self) -> bool {
            true
        }
        fn activate_shield(&self) -> bool {
            self.record("activate")
        }
        fn deactivate_shield(&self) -> bool {
            self.record("deactivate")
        }
        fn is_shield_active(&self) -> bool {
            false
        }
    }

    fn leak_bridge() -> &'static RecordingBridge {
        Box::leak(Box::new(RecordingBridge::default()))
    }

    fn one_blocked() -> BlockedApps {
        BlockedApps::new(vec![BlockedApp {
            id: "a".into(),
            name: "A".into(),
            icon: String::new(),
            is_blocked: true,
            token_data: None,
            is_category: false,
        }])
    }

    #[test]
    fn decide_is_pure_and_matches_rule() {
        let apps = one_blocked();
        let incomplete = DailyProgress::new("2026-08-07");
        let mut complete = DailyProgress::new("2026-08-07");
        complete.completed = true;

        assert!(decide(&apps, &incomplete).engage);
        assert!(decide(&apps, &incomplete).engage); // same inputs, same output
        assert!(!decide(&apps, &complete).engage);
        assert!(!decide(&BlockedApps::default(), &incomplete).engage);
    }

    #[test]
    fn transition_drives_bridge_after_debounce() {
        let bridge = leak_bridge();
        let mut controller = ShieldController::with_debounce(Box::new(bridge), 1_000);
        let apps = one_blocked();
        let progress = DailyProgress::new("2026-08-07");

        controller.observe(&apps, &progress, 0);
        assert!(controller.flush(500).is_none()); // still inside the window

        let result = controller.flush(1_000).expect("due");
        assert!(result.engage);
        assert!(result.delivered);
        assert_eq!(bridge.calls(), vec!["activate"]);
        assert_eq!(controller.applied(), Some(true));
    }

    #[test]
    fn churn_inside_window_coalesces() {
        let bridge = leak_bridge();
        let mut controller = ShieldController::with_debounce(Box::new(bridge), 1_000);
        let apps = one_blocked();
        let mut progress = DailyProgress::new("2026-08-07");

        controller.sync_now(&apps, &progress);
        assert_eq!(bridge.calls(), vec!["activate"]);

        // Goal completes then the user blocks/unblocks rapidly: the
        // net state equals the applied one, so nothing is sent.
        progress.completed = true;
        controller.observe(&apps, &progress, 0);
        progress.completed = false;
        controller.observe(&apps, &progress, 100);
        assert!(controller.flush(2_000).is_none());
        assert_eq!(bridge.calls(), vec!["activate"]);
    }

    #[test]
    fn failed_command_is_retried_once() {
        let bridge = leak_bridge();
        bridge.fail_next.store(1, Ordering::SeqCst);
        let mut controller = ShieldController::new(Box::new(bridge));
        let apps = one_blocked();
        let progress = DailyProgress::new("2026-08-07");

        let result = controller.sync_now(&apps, &progress).expect("transition");
        assert!(result.delivered);
        assert_eq!(bridge.calls(), vec!["activate", "activate"]);
    }

    #[test]
    fn double_failure_keeps_logical_state() {
        let bridge = leak_bridge();
        bridge.fail_next.store(2, Ordering::SeqCst);
        let mut controller = ShieldController::new(Box::new(bridge));
        let apps = one_blocked();
        let progress = DailyProgress::new("2026-08-07");

        let result = controller.sync_now(&apps, &progress).expect("transition");
        assert!(!result.delivered);
        assert_eq!(controller.applied(), Some(true));
        // No further command for the same state.
        assert!(controller.sync_now(&apps, &progress).is_none());
    }

    #[test]
    fn completion_releases_shield() {
        let bridge = leak_bridge();
        let mut controller = ShieldController::new(Box::new(bridge));
        let apps = one_blocked();
        let mut progress = DailyProgress::new("2026-08-07");

        controller.sync_now(&apps, &progress);
        progress.completed = true;
        let result = controller.sync_now(&apps, &progress).expect("release");
        assert!(!result.engage);
        assert_eq!(bridge.calls(), vec!["activate", "deactivate"]);
    }
}
