use crate::{LogLine, StreamSource};

use chrono::{TimeZone, Utc};
use googletest::prelude::*;

#[test]
fn given_stderr_line_when_serialized_then_stream_is_tagged() {
    // Given
    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    let line = LogLine::stderr(at, "boom");

    // When
    let value = serde_json::to_value(&line).unwrap();

    // Then
    assert_that!(value["stream"].as_str(), some(eq("stderr")));
    assert_that!(value["text"].as_str(), some(eq("boom")));
    assert_that!(line.stream, eq(StreamSource::Stderr));
}
