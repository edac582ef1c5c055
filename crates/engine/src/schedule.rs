//! Calendar-safe monthly schedules.
//!
//! Occurrence `k` is always derived from the start date (never from the
//! previous occurrence), so a day clamped in a short month comes back in the
//! following long one: Jan 31 → Feb 29 → Mar 31.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{EngineError, ResultEngine};

/// Accepted layouts for a base date coming from a form.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Advances `start` by `months` calendar months, keeping the day of month
/// when it exists and clamping to the month's last day otherwise. The time of
/// day is left untouched.
pub fn add_months_clamped(start: NaiveDateTime, months: u32) -> ResultEngine<NaiveDateTime> {
    // `checked_add_months` already clamps to the last valid day.
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| EngineError::Validation(format!("date out of range: {start} + {months}")))
}

/// Returns `occurrences` dates, one per calendar month, starting at `start`.
pub fn monthly_dates(start: NaiveDateTime, occurrences: u32) -> ResultEngine<Vec<NaiveDateTime>> {
    (0..occurrences)
        .map(|k| add_months_clamped(start, k))
        .collect()
}

/// Same as [`monthly_dates`] for plain calendar dates.
pub fn monthly_days(start: NaiveDate, occurrences: u32) -> ResultEngine<Vec<NaiveDate>> {
    let dates = monthly_dates(start.and_time(NaiveTime::MIN), occurrences)?;
    Ok(dates.into_iter().map(|d| d.date()).collect())
}

/// Parses a base date, either `YYYY-MM-DD` or an ISO date-time.
///
/// An RFC 3339 offset is accepted and dropped; the wall-clock time as written
/// is kept.
pub fn parse_base_date(value: &str) -> ResultEngine<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.naive_local());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            EngineError::Validation(format!("invalid date '{value}', expected YYYY-MM-DD"))
        })
}
