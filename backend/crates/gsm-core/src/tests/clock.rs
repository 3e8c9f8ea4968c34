use crate::{Clock, ManualClock};

use chrono::{Duration, TimeZone, Utc};
use googletest::prelude::*;

#[test]
fn given_manual_clock_when_advanced_then_now_moves_by_exact_amount() {
    // Given
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start);

    // When
    clock.advance(Duration::seconds(90));

    // Then
    assert_that!(clock.now(), eq(start + Duration::seconds(90)));
}

#[test]
fn given_manual_clock_when_set_then_now_returns_new_instant() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let later = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();

    clock.set(later);

    assert_that!(clock.now(), eq(later));
}
