use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Which end of a range a date-only value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// Midnight UTC at the start of the day.
    Start,
    /// The last microsecond of the day.
    End,
}

/// Parses an RFC 3339 timestamp, a zone-less ISO timestamp (read as UTC) or
/// a bare `YYYY-MM-DD` date.
pub fn parse_datetime(value: &str, bound: DateBound) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let naive = match bound {
        DateBound::Start => date.and_hms_opt(0, 0, 0)?,
        DateBound::End => date.and_hms_micro_opt(23, 59, 59, 999_999)?,
    };
    Some(naive.and_utc())
}
