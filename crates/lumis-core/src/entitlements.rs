//! Entitlement ledger: consumable grants that can satisfy the daily
//! goal without organic light exposure.
//!
//! Three sources exist: purchased emergency flares (one use per day),
//! purchased skip passes, and a free monthly unlock allotment. A
//! consumed entitlement forces today's completion, recorded distinctly
//! from organic completion via the override flag on the progress
//! record. Counters never go negative; grants are additive and
//! deliberately not de-duplicated (one purchase = one grant, de-dup is
//! the payment provider's job).

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Purchasable grant kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    EmergencyFlare,
    SkipPass,
}

/// Which pool satisfied an unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockSource {
    EmergencyFlare,
    SkipPass,
    MonthlyFree,
}

/// Result of a consume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeOutcome {
    pub success: bool,
    pub source: Option<UnlockSource>,
}

impl ConsumeOutcome {
    fn failure() -> Self {
        Self {
            success: false,
            source: None,
        }
    }

    fn consumed(source: UnlockSource) -> Self {
        Self {
            success: true,
            source: Some(source),
        }
    }
}

/// Free unlocks granted at the start of each month.
pub const DEFAULT_MONTHLY_FREE_UNLOCKS: u32 = 3;

/// Local month key for a timestamp, `YYYY-MM`.
pub fn month_key_for(at: DateTime<Local>) -> String {
    at.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementLedger {
    emergency_flares: u32,
    skip_passes: u32,
    emergency_unlock_used_today: bool,
    monthly_free_unlocks_remaining: u32,
    /// Month the free allotment belongs to, `YYYY-MM`.
    month_key: String,
}

impl EntitlementLedger {
    pub fn new(month_key: impl Into<String>) -> Self {
        Self {
            emergency_flares: 0,
            skip_passes: 0,
            emergency_unlock_used_today: false,
            monthly_free_unlocks_remaining: DEFAULT_MONTHLY_FREE_UNLOCKS,
            month_key: month_key.into(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn emergency_flares(&self) -> u32 {
        self.emergency_flares
    }

    pub fn skip_passes(&self) -> u32 {
        self.skip_passes
    }

    pub fn emergency_unlock_used_today(&self) -> bool {
        self.emergency_unlock_used_today
    }

    pub fn monthly_free_unlocks_remaining(&self) -> u32 {
        self.monthly_free_unlocks_remaining
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Additive grant after a successful purchase.
    pub fn grant(&mut self, kind: GrantKind, quantity: u32) {
        match kind {
            GrantKind::EmergencyFlare => {
                self.emergency_flares = self.emergency_flares.saturating_add(quantity)
            }
            GrantKind::SkipPass => {
                self.skip_passes = self.skip_passes.saturating_add(quantity)
            }
        }
    }

    /// Spend an emergency flare.
    ///
    /// Gated to at most one success per day; a second call the same
    /// day fails without side effects.
    pub fn consume_emergency_unlock(&mut self) -> ConsumeOutcome {
        if self.emergency_unlock_used_today || self.emergency_flares == 0 {
            return ConsumeOutcome::failure();
        }
        self.emergency_flares -= 1;
        self.emergency_unlock_used_today = true;
        ConsumeOutcome::consumed(UnlockSource::EmergencyFlare)
    }

    /// Spend a skip pass, preferring purchased passes over the free
    /// monthly allotment.
    pub fn consume_skip_pass(&mut self) -> ConsumeOutcome {
        if self.skip_passes > 0 {
            self.skip_passes -= 1;
            ConsumeOutcome::consumed(UnlockSource::SkipPass)
        } else if self.monthly_free_unlocks_remaining > 0 {
            self.monthly_free_unlocks_remaining -= 1;
            ConsumeOutcome::consumed(UnlockSource::MonthlyFree)
        } else {
            ConsumeOutcome::failure()
        }
    }

    /// Clear the once-per-day emergency gate. Called at day rollover.
    pub fn reset_daily_gate(&mut self) {
        self.emergency_unlock_used_today = false;
    }

    /// Restore the free allotment when the month changed. Returns true
    /// when a reset happened.
    pub fn reset_monthly_if_due(&mut self, month_key: &str) -> bool {
        if self.month_key == month_key {
            return false;
        }
        self.month_key = month_key.to_string();
        self.monthly_free_unlocks_remaining = DEFAULT_MONTHLY_FREE_UNLOCKS;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_unlock_succeeds_once_per_day() {
        let mut ledger = EntitlementLedger::new("2026-08");
        ledger.grant(GrantKind::EmergencyFlare, 2);

        let first = ledger.consume_emergency_unlock();
        assert!(first.success);
        assert_eq!(first.source, Some(UnlockSource::EmergencyFlare));
        assert_eq!(ledger.emergency_flares(), 1);

        let second = ledger.consume_emergency_unlock();
        assert!(!second.success);
        assert_eq!(ledger.emergency_flares(), 1);

        ledger.reset_daily_gate();
        assert!(ledger.consume_emergency_unlock().success);
        assert_eq!(ledger.emergency_flares(), 0);
    }

    #[test]
    fn emergency_unlock_requires_a_flare() {
        let mut ledger = EntitlementLedger::new("2026-08");
        assert!(!ledger.consume_emergency_unlock().success);
        assert!(!ledger.emergency_unlock_used_today());
    }

    #[test]
    fn skip_pass_prefers_purchased_over_free() {
        let mut ledger = EntitlementLedger::new("2026-08");
        ledger.grant(GrantKind::SkipPass, 1);

        let out = ledger.consume_skip_pass();
        assert_eq!(out.source, Some(UnlockSource::SkipPass));
        assert_eq!(ledger.skip_passes(), 0);
        assert_eq!(
            ledger.monthly_free_unlocks_remaining(),
            DEFAULT_MONTHLY_FREE_UNLOCKS
        );

        let out = ledger.consume_skip_pass();
        assert_eq!(out.source, Some(UnlockSource::MonthlyFree));
        assert_eq!(
            ledger.monthly_free_unlocks_remaining(),
            DEFAULT_MONTHLY_FREE_UNLOCKS - 1
        );
    }

    #[test]
    fn skip_pass_fails_when_both_pools_empty() {
        let mut ledger = EntitlementLedger::new("2026-08");
        for _ in 0..DEFAULT_MONTHLY_FREE_UNLOCKS {
            assert!(ledger.consume_skip_pass().success);
        }
        assert!(!ledger.consume_skip_pass().success);
        assert_eq!(ledger.monthly_free_unlocks_remaining(), 0);
    }

    #[test]
    fn monthly_reset_restores_free_allotment() {
        let mut ledger = EntitlementLedger::new("2026-07");
        while ledger.consume_skip_pass().success {}
        assert_eq!(ledger.monthly_free_unlocks_remaining(), 0);

        assert!(!ledger.reset_monthly_if_due("2026-07"));
        assert!(ledger.reset_monthly_if_due("2026-08"));
        assert_eq!(
            ledger.monthly_free_unlocks_remaining(),
            DEFAULT_MONTHLY_FREE_UNLOCKS
        );
    }

    #[test]
    fn grants_are_additive_not_idempotent() {
        let mut ledger = EntitlementLedger::new("2026-08");
        ledger.grant(GrantKind::SkipPass, 2);
        ledger.grant(GrantKind::SkipPass, 2);
        assert_eq!(ledger.skip_passes(), 4);
    }
}
