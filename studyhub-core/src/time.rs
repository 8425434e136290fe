//! Time utilities: timezone-aware calendar days and Monday-based weeks.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::ConfigError;

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// Calendar day of `instant` as seen in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// True when `date` falls in the Monday-based week starting at `start`.
pub fn in_week(date: NaiveDate, start: NaiveDate) -> bool {
    date >= start && date < start + Duration::days(7)
}
