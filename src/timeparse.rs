//! Human-friendly time and duration parsing.
//!
//! Turns the small vocabulary users type at the prompt ("yesterday 9am",
//! "today 7:34am", "3 days ago", "7:30") into absolute timestamps or minute
//! counts. Resolution happens once, against an explicit reference `now`; the
//! result carries no memory of how it was expressed.

use crate::constants::{DATE_FORMAT_ISO, MAX_DURATION_MINUTES, MINUTES_PER_HOUR};
use crate::errors::ParseError;
use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Timelike,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Naive date-time layouts accepted as absolute timestamps, tried in order.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s*(days?|hours?|minutes?|mins?)\s*ago$")
        .expect("relative offset pattern is valid")
});

static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(today|yesterday|tomorrow)\s+(.+)$").expect("day keyword pattern is valid")
});

static DATE_CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})\s+(.+)$")
        .expect("date and clock pattern is valid")
});

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm)?$").expect("clock pattern is valid")
});

static UNIT_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s*h)?\s*(?:(\d+)\s*m)?$").expect("unit duration pattern is valid")
});

/// Parses a user-supplied time expression into an absolute timestamp.
///
/// Accepted forms, tried in this order:
///
/// 1. ISO-like absolute values: RFC 3339 with an offset, naive
///    `YYYY-MM-DD[T| ]HH:MM[:SS]` (interpreted in local time), or a bare
///    `YYYY-MM-DD` (local midnight)
/// 2. Relative offsets: `3 days ago`, `2 hours ago`, `15 minutes ago`
/// 3. Day keywords with a clock: `today 7:34am`, `yesterday 9am`, `tomorrow 19:00`
/// 4. A date with a clock: `2026-02-25 7:34am`, `2026/02/25 19:34`
/// 5. A bare clock, anchored to today: `7:34am`, `14:00`
///
/// The result has seconds precision and carries the local offset in effect at
/// that instant.
///
/// # Errors
///
/// Returns a `ParseError` naming the offending input when nothing matches, the
/// date is impossible, or the local time does not exist (DST gap). There is no
/// fallback to `now`.
///
/// # Examples
///
/// ```
/// use chaoscatcher::timeparse::parse_timestamp;
/// use chrono::{Local, NaiveDate, TimeZone, Timelike};
///
/// let now = Local
///     .from_local_datetime(&NaiveDate::from_ymd_opt(2026, 2, 25).unwrap().and_hms_opt(12, 0, 0).unwrap())
///     .earliest()
///     .unwrap();
///
/// let ts = parse_timestamp("yesterday 9am", now).unwrap();
/// assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2026, 2, 24).unwrap());
/// assert_eq!(ts.hour(), 9);
/// ```
pub fn parse_timestamp(
    input: &str,
    now: DateTime<Local>,
) -> Result<DateTime<FixedOffset>, ParseError> {
    let trimmed = input.trim();
    let unparseable = || ParseError::Timestamp {
        input: input.to_string(),
    };

    if trimmed.is_empty() {
        return Err(unparseable());
    }

    if let Some(ts) = parse_absolute(trimmed) {
        return Ok(ts);
    }

    let lowered = trimmed.to_lowercase();

    if let Some(caps) = RELATIVE_RE.captures(&lowered) {
        let amount: i64 = caps[1].parse().map_err(|_| unparseable())?;
        let delta = match caps[2].chars().next() {
            Some('d') => TimeDelta::try_days(amount),
            Some('h') => TimeDelta::try_hours(amount),
            _ => TimeDelta::try_minutes(amount),
        }
        .ok_or_else(unparseable)?;
        let resolved = now.checked_sub_signed(delta).ok_or_else(unparseable)?;
        return Ok(truncate_subsec(resolved.fixed_offset()));
    }

    if let Some(caps) = KEYWORD_RE.captures(&lowered) {
        let today = now.date_naive();
        let date = match &caps[1] {
            "yesterday" => today.pred_opt(),
            "tomorrow" => today.succ_opt(),
            _ => Some(today),
        }
        .ok_or_else(unparseable)?;
        let clock = parse_clock(&caps[2])?;
        return anchor(date, clock).ok_or_else(unparseable);
    }

    if let Some(caps) = DATE_CLOCK_RE.captures(&lowered) {
        let year: i32 = caps[1].parse().map_err(|_| unparseable())?;
        let month: u32 = caps[2].parse().map_err(|_| unparseable())?;
        let day: u32 = caps[3].parse().map_err(|_| unparseable())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unparseable)?;
        let clock = parse_clock(&caps[4])?;
        return anchor(date, clock).ok_or_else(unparseable);
    }

    let clock = parse_clock(&lowered).map_err(|_| unparseable())?;
    anchor(now.date_naive(), clock).ok_or_else(unparseable)
}

/// Parses a clock expression such as `9am`, `7:34 pm` or `14:00`.
///
/// 12-hour forms need an `am`/`pm` suffix and an hour between 1 and 12.
/// 24-hour forms need minutes (`7:00`, not `7`) and an hour between 0 and 23.
///
/// # Errors
///
/// Returns `ParseError::Clock` for anything else.
pub fn parse_clock(input: &str) -> Result<NaiveTime, ParseError> {
    let lowered = input.trim().to_lowercase();
    let invalid = || ParseError::Clock {
        input: input.trim().to_string(),
    };

    let caps = CLOCK_RE.captures(&lowered).ok_or_else(invalid)?;
    let raw_hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };

    let hour = match caps.get(3).map(|m| m.as_str()) {
        Some(meridiem) => {
            if !(1..=12).contains(&raw_hour) {
                return Err(invalid());
            }
            let base = raw_hour % 12;
            if meridiem == "pm" {
                base + 12
            } else {
                base
            }
        }
        None => {
            // A bare number like "7" is ambiguous between 7am and 7pm.
            if caps.get(2).is_none() || raw_hour > 23 {
                return Err(invalid());
            }
            raw_hour
        }
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parses a duration into whole minutes.
///
/// Accepts `H:MM` (`7:30`), plain minutes (`90`) and unit forms (`7h30m`,
/// `7h`, `45m`). Durations are bounded to a single day.
///
/// # Errors
///
/// Returns `ParseError::Duration` when the input is empty, signed, malformed,
/// has minutes of 60 or more in `H:MM` form, or exceeds 24 hours.
///
/// # Examples
///
/// ```
/// use chaoscatcher::timeparse::parse_duration;
///
/// assert_eq!(parse_duration("7:30").unwrap(), 450);
/// assert_eq!(parse_duration("1h15m").unwrap(), 75);
/// assert!(parse_duration("25:00").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<u32, ParseError> {
    let lowered = input.trim().to_lowercase();
    let reject = |reason: &str| ParseError::Duration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if lowered.is_empty() {
        return Err(reject("empty duration"));
    }
    if lowered.starts_with('-') {
        return Err(reject("durations cannot be negative"));
    }

    let total: u64 = if let Some((hours, minutes)) = lowered.split_once(':') {
        if !is_digits(hours) || !is_digits(minutes) {
            return Err(reject("expected H:MM"));
        }
        let hours: u64 = hours.parse().map_err(|_| reject("value too large"))?;
        let minutes: u64 = minutes.parse().map_err(|_| reject("value too large"))?;
        if minutes >= u64::from(MINUTES_PER_HOUR) {
            return Err(reject("minutes must be below 60"));
        }
        hours
            .checked_mul(u64::from(MINUTES_PER_HOUR))
            .and_then(|h| h.checked_add(minutes))
            .ok_or_else(|| reject("value too large"))?
    } else if is_digits(&lowered) {
        lowered.parse().map_err(|_| reject("value too large"))?
    } else {
        let caps = UNIT_DURATION_RE
            .captures(&lowered)
            .ok_or_else(|| reject("unrecognized format"))?;
        if caps.get(1).is_none() && caps.get(2).is_none() {
            return Err(reject("unrecognized format"));
        }
        let hours: u64 = match caps.get(1) {
            Some(h) => h.as_str().parse().map_err(|_| reject("value too large"))?,
            None => 0,
        };
        let minutes: u64 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| reject("value too large"))?,
            None => 0,
        };
        hours
            .checked_mul(u64::from(MINUTES_PER_HOUR))
            .and_then(|h| h.checked_add(minutes))
            .ok_or_else(|| reject("value too large"))?
    };

    if total > u64::from(MAX_DURATION_MINUTES) {
        return Err(reject("longer than 24 hours"));
    }

    // Bounded above, so the conversion cannot truncate.
    Ok(total as u32)
}

fn parse_absolute(input: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(truncate_subsec(ts));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return localize(naive);
        }
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT_ISO)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(localize)
}

fn anchor(date: NaiveDate, clock: NaiveTime) -> Option<DateTime<FixedOffset>> {
    localize(date.and_time(clock))
}

fn localize(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| truncate_subsec(dt.fixed_offset()))
}

fn truncate_subsec(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.with_nanosecond(0).unwrap_or(ts)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
