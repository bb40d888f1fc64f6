//! Entitlement consumption against the store: forced completion,
//! daily exclusivity, and pool preference.

use chrono::{DateTime, Local, TimeZone};
use lumis_core::entitlements::DEFAULT_MONTHLY_FREE_UNLOCKS;
use lumis_core::{Event, GrantKind, LumisStore, UnlockSource};

fn at(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
}

#[test]
fn free_monthly_unlock_covers_missing_skip_passes() {
    let mut store = LumisStore::new(at(7, 7));
    assert_eq!(store.ledger().skip_passes(), 0);
    assert_eq!(
        store.ledger().monthly_free_unlocks_remaining(),
        DEFAULT_MONTHLY_FREE_UNLOCKS
    );

    let (outcome, events) = store.consume_skip_pass(at(7, 20));
    assert!(outcome.success);
    assert_eq!(outcome.source, Some(UnlockSource::MonthlyFree));
    assert_eq!(
        store.ledger().monthly_free_unlocks_remaining(),
        DEFAULT_MONTHLY_FREE_UNLOCKS - 1
    );
    assert!(store.progress().completed);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::GoalCompleted {
            via_override: true,
            ..
        }
    )));
}

#[test]
fn purchased_passes_spend_before_free_ones() {
    let mut store = LumisStore::new(at(7, 7));
    store.grant(GrantKind::SkipPass, 1);

    let (outcome, _) = store.consume_skip_pass(at(7, 20));
    assert_eq!(outcome.source, Some(UnlockSource::SkipPass));
    assert_eq!(store.ledger().skip_passes(), 0);
    assert_eq!(
        store.ledger().monthly_free_unlocks_remaining(),
        DEFAULT_MONTHLY_FREE_UNLOCKS
    );
}

#[test]
fn emergency_unlock_is_exclusive_per_day() {
    let mut store = LumisStore::new(at(7, 7));
    store.grant(GrantKind::EmergencyFlare, 3);

    let (first, _) = store.consume_emergency_unlock(at(7, 8));
    assert!(first.success);
    assert!(store.ledger().emergency_unlock_used_today());

    // Second call the same day fails with no side effects.
    let flares_before = store.ledger().emergency_flares();
    let (second, events) = store.consume_emergency_unlock(at(7, 9));
    assert!(!second.success);
    assert!(events.is_empty());
    assert_eq!(store.ledger().emergency_flares(), flares_before);

    // The gate clears at the next day boundary.
    store.rollover_if_due(at(8, 0));
    let (next_day, _) = store.consume_emergency_unlock(at(8, 8));
    assert!(next_day.success);
}

#[test]
fn override_completion_is_flagged_distinctly() {
    let mut store = LumisStore::new(at(7, 7));
    store.grant(GrantKind::EmergencyFlare, 1);

    store.consume_emergency_unlock(at(7, 8));
    assert!(store.progress().completed);
    assert!(store.progress().completed_via_override);

    // An organically completed day carries no override flag.
    let mut organic = LumisStore::new(at(7, 7));
    organic.credit_minutes(15.0, false, at(7, 7));
    assert!(organic.progress().completed);
    assert!(!organic.progress().completed_via_override);
}

#[test]
fn consuming_after_completion_spends_without_second_event() {
    let mut store = LumisStore::new(at(7, 7));
    store.credit_minutes(15.0, false, at(7, 7));
    store.grant(GrantKind::SkipPass, 1);

    let (outcome, events) = store.consume_skip_pass(at(7, 8));
    assert!(outcome.success);
    // The day is already complete: the pass is spent, the override is
    // recorded, but completion does not fire twice.
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::OverrideConsumed { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::GoalCompleted { .. })));
    assert!(!store.progress().completed_via_override);
}
