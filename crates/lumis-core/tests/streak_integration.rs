//! Multi-day streak behavior across rollovers.

use chrono::{DateTime, Local, TimeZone};
use lumis_core::{Event, GrantKind, LumisStore};

fn at(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
}

#[test]
fn consecutive_completed_days_accumulate() {
    let mut store = LumisStore::new(at(1, 7));

    for day in 1..=5 {
        store.credit_minutes(15.0, false, at(day, 7));
        store.rollover_if_due(at(day + 1, 0));
    }
    assert_eq!(store.streak().current_streak, 5);
    assert_eq!(store.streak().longest_streak, 5);
}

#[test]
fn empty_day_resets_current_streak_to_zero() {
    let mut store = LumisStore::new(at(1, 7));

    // Day 1 completed.
    store.credit_minutes(15.0, false, at(1, 7));
    store.rollover_if_due(at(2, 0));
    assert_eq!(store.streak().current_streak, 1);

    // Day 2 passes with zero credited minutes and no override.
    let events = store.rollover_if_due(at(3, 0));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::StreakBroken { previous_streak: 1, .. })));
    assert_eq!(store.streak().current_streak, 0);
    assert_eq!(store.streak().longest_streak, 1);
}

#[test]
fn longest_streak_survives_breaks() {
    let mut store = LumisStore::new(at(1, 7));

    // Three completed days.
    for day in 1..=3 {
        store.credit_minutes(20.0, false, at(day, 7));
        store.rollover_if_due(at(day + 1, 0));
    }
    assert_eq!(store.streak().longest_streak, 3);

    // Day 4 missed; days 5-6 completed.
    store.rollover_if_due(at(5, 0));
    assert_eq!(store.streak().current_streak, 0);
    for day in 5..=6 {
        store.credit_minutes(20.0, false, at(day, 7));
        store.rollover_if_due(at(day + 1, 0));
    }
    assert_eq!(store.streak().current_streak, 2);
    assert_eq!(store.streak().longest_streak, 3);
}

#[test]
fn override_day_counts_toward_continuity() {
    let mut store = LumisStore::new(at(1, 7));
    store.grant(GrantKind::SkipPass, 1);

    store.credit_minutes(15.0, false, at(1, 7));
    store.rollover_if_due(at(2, 0));

    // Day 2: no light, skip pass instead.
    let (outcome, _) = store.consume_skip_pass(at(2, 21));
    assert!(outcome.success);
    store.rollover_if_due(at(3, 0));

    // Day 3: organic completion again.
    store.credit_minutes(15.0, false, at(3, 7));
    store.rollover_if_due(at(4, 0));

    assert_eq!(store.streak().current_streak, 3);
}

#[test]
fn multi_day_gap_breaks_streak_on_next_open() {
    let mut store = LumisStore::new(at(1, 7));
    store.credit_minutes(15.0, false, at(1, 7));

    // The app never opened on day 2; the first interaction on day 3
    // performs exactly one rollover and the empty day in between
    // breaks continuity.
    let events = store.credit_minutes(15.0, false, at(3, 7));
    let rollovers = events
        .iter()
        .filter(|e| matches!(e, Event::DayRolledOver { .. }))
        .count();
    assert_eq!(rollovers, 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::StreakBroken { .. })));
    assert_eq!(store.progress().date_key, "2026-08-03");
    assert_eq!(store.streak().current_streak, 0);
    assert_eq!(store.streak().longest_streak, 1);

    // Completing day 3 restarts the streak at the next boundary.
    store.rollover_if_due(at(4, 0));
    assert_eq!(store.streak().current_streak, 1);
}
