//! Column decoding shared by the repositories.

use crate::{DbError, Result as DbErrorResult};

use std::panic::Location;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use uuid::Uuid;

#[track_caller]
pub(crate) fn uuid(table: &'static str, column: &'static str, raw: &str) -> DbErrorResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DbError::Corrupt {
        table,
        column,
        message: format!("invalid UUID '{}': {}", raw, e),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
pub(crate) fn timestamp(
    table: &'static str,
    column: &'static str,
    millis: i64,
) -> DbErrorResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| DbError::Corrupt {
        table,
        column,
        message: format!("timestamp {} out of range", millis),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
pub(crate) fn parsed<T>(table: &'static str, column: &'static str, raw: &str) -> DbErrorResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|e| DbError::Corrupt {
        table,
        column,
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
pub(crate) fn size(table: &'static str, column: &'static str, raw: i64) -> DbErrorResult<u64> {
    u64::try_from(raw).map_err(|_| DbError::Corrupt {
        table,
        column,
        message: format!("negative size {}", raw),
        location: ErrorLocation::from(Location::caller()),
    })
}
