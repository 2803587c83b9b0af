// src/cutoff.rs

//! Parsing of the `--at` cutoff value
//!
//! Accepts absolute timestamps (RFC 3339, `YYYY-MM-DD`,
//! `YYYY-MM-DD HH:MM[:SS]`, all read as UTC) and relative expressions
//! such as `3 days ago`, `2 weeks ago`, `yesterday` or `now`.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse a cutoff relative to the current time
pub fn parse_cutoff(input: &str) -> Result<DateTime<Utc>> {
    parse_cutoff_at(input, Utc::now())
}

/// Parse a cutoff relative to an explicit `now`
pub fn parse_cutoff_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return Err(invalid(input, "empty value"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    parse_relative(text, now).ok_or_else(|| {
        invalid(
            input,
            "expected a date (2021-06-01) or a relative time ('3 days ago')",
        )
    })
}

fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "now" | "today" => return Some(now),
        "yesterday" => return now.checked_sub_signed(Duration::days(1)),
        _ => {}
    }

    let rest = lower.strip_suffix("ago")?.trim_end();
    let mut parts = rest.split_whitespace();
    let amount_text = parts.next()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let amount: i64 = match amount_text {
        "a" | "an" | "one" => 1,
        n => n.parse().ok()?,
    };
    if amount < 0 {
        return None;
    }

    let unit = unit.strip_suffix('s').unwrap_or(unit);
    let span = match unit {
        "second" | "sec" => Duration::try_seconds(amount)?,
        "minute" | "min" => Duration::try_minutes(amount)?,
        "hour" | "hr" => Duration::try_hours(amount)?,
        "day" => Duration::try_days(amount)?,
        "week" => Duration::try_weeks(amount)?,
        "month" => Duration::try_days(amount.checked_mul(30)?)?,
        "year" => Duration::try_days(amount.checked_mul(365)?)?,
        _ => return None,
    };

    now.checked_sub_signed(span)
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidCutoff {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
