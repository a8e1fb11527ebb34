//! Conversions between the XRP Ledger's 'Ripple Epoch' time and UTC instants,
//! plus the bout timing offsets derived from the event start.

use chrono::{DateTime, Duration, TimeZone, Utc};
use strum_macros::Display;

/// The "Ripple Epoch" of 2000-01-01T00:00:00 UTC, in Unix seconds.
pub const RIPPLE_EPOCH_OFFSET: i64 = 946_684_800;
/// The maximum time that can be expressed on the XRPL.
pub const MAX_XRPL_TIME: i64 = u32::MAX as i64;

/// Hours between the event start and the moment show purses become releasable.
const FINISH_AFTER_HOURS: i64 = 2;
/// Days between the event start and the moment bonus purses become reclaimable.
const BONUS_CANCEL_AFTER_DAYS: i64 = 7;

/// Exception for invalid XRP Ledger time data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimeError {
    DatetimeMustBeTimezoneAware,
    RippleTimeOutOfRange,
}

impl std::error::Error for TimeError {}

fn ripple_check_range(time: i64) -> Result<i64, TimeError> {
    if (0..=MAX_XRPL_TIME).contains(&time) {
        Ok(time)
    } else {
        Err(TimeError::RippleTimeOutOfRange)
    }
}

/// Convert Unix seconds to 'Ripple Epoch' seconds.
pub fn unix_to_ripple_epoch(unix_seconds: i64) -> i64 {
    unix_seconds - RIPPLE_EPOCH_OFFSET
}

/// Convert 'Ripple Epoch' seconds to Unix seconds.
pub fn ripple_epoch_to_unix(ripple_seconds: i64) -> i64 {
    ripple_seconds + RIPPLE_EPOCH_OFFSET
}

/// Convert a UTC instant to 'Ripple Epoch' seconds.
pub fn to_ripple_epoch(instant: DateTime<Utc>) -> Result<i64, TimeError> {
    ripple_check_range(unix_to_ripple_epoch(instant.timestamp()))
}

/// Convert 'Ripple Epoch' seconds to a UTC instant.
pub fn from_ripple_epoch(ripple_seconds: i64) -> Result<DateTime<Utc>, TimeError> {
    ripple_check_range(ripple_seconds)?;
    Utc.timestamp_opt(ripple_epoch_to_unix(ripple_seconds), 0)
        .single()
        .ok_or(TimeError::RippleTimeOutOfRange)
}

/// Parse an RFC 3339 datetime that must carry an explicit UTC offset.
///
/// Offset-less input is the wire form of a naive datetime and is rejected.
pub fn parse_utc_datetime(value: &str) -> Result<DateTime<Utc>, TimeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| TimeError::DatetimeMustBeTimezoneAware)
}

/// The moment show and bonus purses become releasable: event start plus two
/// hours.
pub fn compute_finish_after(event_datetime_utc: DateTime<Utc>) -> DateTime<Utc> {
    event_datetime_utc + Duration::hours(FINISH_AFTER_HOURS)
}

/// The moment an unreleased bonus purse becomes reclaimable: event start plus
/// seven days.
pub fn compute_bonus_cancel_after(event_datetime_utc: DateTime<Utc>) -> DateTime<Utc> {
    event_datetime_utc + Duration::days(BONUS_CANCEL_AFTER_DAYS)
}
