//! Header timestamps.
//!
//! Exports write civil time at minute resolution with a two-digit year and no
//! offset. Years are always taken to be `20YY`, and the wall-clock time is
//! resolved in Central European time:
//!
//! - CET (UTC+01:00) outside summer time
//! - CEST (UTC+02:00) from the last Sunday of March, 03:00 local, up to the
//!   last Sunday of October, 03:00 local
//!
//! Wall-clock times that do not exist (the spring gap) resolve with the
//! standard offset; times that occur twice (the autumn overlap) resolve with
//! the summer offset.

use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};

use crate::error::{ChatvaultError, Result};
use crate::message::Timestamp;

const CET_SECONDS: i32 = 3600;
const CEST_SECONDS: i32 = 2 * 3600;

/// Builds a timestamp from the five two-digit header fields.
///
/// # Example
///
/// ```
/// use chatvault::parsing::timestamp::parse_timestamp;
///
/// let ts = parse_timestamp("16", "01", "21", "23", "09")?;
/// assert_eq!(ts.to_rfc3339(), "2021-01-16T23:09:00+01:00");
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
pub fn parse_timestamp(day: &str, month: &str, year: &str, hour: &str, minute: &str) -> Result<Timestamp> {
    let invalid = || ChatvaultError::invalid_timestamp(format!("{day}.{month}.{year}, {hour}:{minute}"));

    let field = |s: &str| s.parse::<u32>().map_err(|_| invalid());
    let year = 2000 + i32::try_from(field(year)?).map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, field(month)?, field(day)?).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(field(hour)?, field(minute)?, 0).ok_or_else(invalid)?;

    localize(date.and_time(time)).ok_or_else(invalid)
}

/// Resolves a wall-clock time in the reference zone.
pub fn localize(local: NaiveDateTime) -> Option<Timestamp> {
    let offset = FixedOffset::east_opt(offset_seconds(local))?;
    offset.from_local_datetime(&local).single()
}

/// UTC offset in seconds for a wall-clock time.
fn offset_seconds(local: NaiveDateTime) -> i32 {
    let year = local.year();
    let (Some(start), Some(end)) = (
        last_sunday(year, 3).and_then(|d| d.and_hms_opt(3, 0, 0)),
        last_sunday(year, 10).and_then(|d| d.and_hms_opt(3, 0, 0)),
    ) else {
        return CET_SECONDS;
    };

    if local >= start && local < end {
        CEST_SECONDS
    } else {
        CET_SECONDS
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = first_of_next.pred_opt()?;
    let back = last.weekday().num_days_from_sunday();
    let sunday = last.checked_sub_days(Days::new(u64::from(back)))?;
    debug_assert_eq!(sunday.weekday(), Weekday::Sun);
    Some(sunday)
}
