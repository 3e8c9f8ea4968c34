use crate::LogBroadcaster;

use gsm_core::{LogLine, StreamSource};

use chrono::{TimeZone, Utc};
use googletest::prelude::*;
use proptest::prelude::*;

fn line(n: usize) -> LogLine {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    LogLine::stdout(at, format!("line {}", n))
}

fn texts(lines: &[LogLine]) -> Vec<String> {
    lines.iter().map(|l| l.text.clone()).collect()
}

#[test]
fn given_more_lines_than_capacity_when_subscribing_then_backlog_holds_newest_in_order() {
    // Given
    let broadcaster = LogBroadcaster::new(3, 16);
    for n in 0..5 {
        broadcaster.publish(line(n));
    }

    // When
    let (backlog, _receiver) = broadcaster.subscribe();

    // Then
    assert_eq!(texts(&backlog), vec!["line 2", "line 3", "line 4"]);
}

#[test]
fn given_subscriber_when_lines_published_then_live_lines_exclude_backlog() {
    // Given
    let broadcaster = LogBroadcaster::new(10, 16);
    broadcaster.publish(line(0));
    let (backlog, mut receiver) = broadcaster.subscribe();

    // When
    broadcaster.publish(line(1));
    broadcaster.publish(line(2));

    // Then
    assert_eq!(texts(&backlog), vec!["line 0"]);
    let live: Vec<LogLine> = std::iter::from_fn(|| receiver.try_recv()).collect();
    assert_eq!(texts(&live), vec!["line 1", "line 2"]);
}

#[test]
fn given_slow_subscriber_when_buffer_overflows_then_oldest_lines_are_dropped_and_counted() {
    // Given
    let broadcaster = LogBroadcaster::new(100, 4);
    let (_, mut slow) = broadcaster.subscribe();

    // When
    for n in 0..10 {
        broadcaster.publish(line(n));
    }
    let received: Vec<LogLine> = std::iter::from_fn(|| slow.try_recv()).collect();

    // Then
    assert_eq!(texts(&received), vec!["line 6", "line 7", "line 8", "line 9"]);
    assert_that!(slow.dropped_lines(), eq(6));
    assert_that!(broadcaster.dropped_lines(), eq(6));
}

#[test]
fn given_slow_subscriber_when_overflowing_then_fast_subscriber_is_unaffected() {
    // Given
    let broadcaster = LogBroadcaster::new(100, 4);
    let (_, mut slow) = broadcaster.subscribe();
    let (_, mut fast) = broadcaster.subscribe();

    // When
    let mut fast_seen = Vec::new();
    for n in 0..10 {
        broadcaster.publish(line(n));
        fast_seen.extend(std::iter::from_fn(|| fast.try_recv()));
    }

    // Then
    assert_that!(fast_seen.len(), eq(10));
    assert_that!(fast.dropped_lines(), eq(0));
    let _ = std::iter::from_fn(|| slow.try_recv()).count();
    assert_that!(slow.dropped_lines(), eq(6));
}

#[test]
fn given_subscriber_when_unsubscribed_twice_then_count_drops_once() {
    // Given
    let broadcaster = LogBroadcaster::new(10, 4);
    let (_, mut first) = broadcaster.subscribe();
    let (_, _second) = broadcaster.subscribe();
    assert_that!(broadcaster.subscriber_count(), eq(2));

    // When
    broadcaster.unsubscribe(&mut first);
    broadcaster.unsubscribe(&mut first);

    // Then
    assert_that!(broadcaster.subscriber_count(), eq(1));
    assert_that!(first.is_subscribed(), eq(false));
    assert!(first.try_recv().is_none());
}

#[test]
fn given_receiver_when_dropped_then_subscriber_count_decreases() {
    let broadcaster = LogBroadcaster::new(10, 4);
    let (_, receiver) = broadcaster.subscribe();

    drop(receiver);

    assert_that!(broadcaster.subscriber_count(), eq(0));
}

#[test]
fn given_no_subscribers_when_publishing_then_backlog_still_fills() {
    let broadcaster = LogBroadcaster::new(2, 4);

    broadcaster.publish(line(0));
    broadcaster.publish(LogLine::new(line(1).timestamp, StreamSource::Stderr, "oops"));

    let backlog = broadcaster.backlog();
    assert_that!(backlog.len(), eq(2));
    assert_that!(backlog[1].stream, eq(StreamSource::Stderr));
}

#[tokio::test]
async fn given_subscriber_waiting_when_line_published_then_recv_returns_it() {
    // Given
    let broadcaster = LogBroadcaster::new(10, 4);
    let (_, mut receiver) = broadcaster.subscribe();
    let publisher = broadcaster.clone();

    // When
    tokio::spawn(async move { publisher.publish(line(7)) });
    let received = receiver.recv().await;

    // Then
    assert_eq!(received.map(|l| l.text).as_deref(), Some("line 7"));
}

proptest! {
    #[test]
    fn backlog_is_the_newest_lines_in_publish_order(
        capacity in 1usize..32,
        before in 0usize..64,
        after in 0usize..16,
    ) {
        let broadcaster = LogBroadcaster::new(capacity, 64);
        for n in 0..before {
            broadcaster.publish(line(n));
        }

        let (backlog, mut receiver) = broadcaster.subscribe();
        for n in before..before + after {
            broadcaster.publish(line(n));
        }
        let live: Vec<LogLine> = std::iter::from_fn(|| receiver.try_recv()).collect();

        let expected_backlog: Vec<String> =
            (before.saturating_sub(capacity)..before).map(|n| format!("line {}", n)).collect();
        let expected_live: Vec<String> = (before..before + after).map(|n| format!("line {}", n)).collect();
        prop_assert_eq!(texts(&backlog), expected_backlog);
        prop_assert_eq!(texts(&live), expected_live);
        prop_assert_eq!(receiver.dropped_lines(), 0);
    }
}
