//! Read-side queries over logged entries.
//!
//! Everything here is pure: functions take entries plus an explicit `now` and
//! never touch the filesystem or the system clock.

use crate::errors::{AppError, AppResult};
use crate::records::Timestamped;
use chrono::{DateTime, Days, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Inclusive bounds on an entry's local calendar date.
///
/// # Examples
///
/// ```
/// use chaoscatcher::ops::DateFilter;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2026, 2, 25).unwrap();
/// let filter = DateFilter::between(Some(day), None);
///
/// assert!(filter.contains(day));
/// assert!(!filter.contains(day.pred_opt().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    /// Earliest date included.
    pub from: Option<NaiveDate>,
    /// Latest date included.
    pub to: Option<NaiveDate>,
}

impl DateFilter {
    /// A filter that matches every entry.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter with the given inclusive bounds.
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateFilter { from, to }
    }

    /// A filter matching a single day.
    pub fn on(date: NaiveDate) -> Self {
        DateFilter {
            from: Some(date),
            to: Some(date),
        }
    }

    /// Whether `date` falls within the bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// How far back a stats or export computation looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// The trailing `n` days, today included.
    Days(u32),
    /// Every entry ever logged.
    AllTime,
}

impl Window {
    /// Resolves the window into a date filter relative to `today`.
    ///
    /// A day window never reaches past `today`, so future-dated entries are
    /// excluded. `AllTime` is unbounded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a zero-day window.
    pub fn filter(&self, today: NaiveDate) -> AppResult<DateFilter> {
        match *self {
            Window::AllTime => Ok(DateFilter::all()),
            Window::Days(0) => Err(AppError::Validation(
                "window must cover at least 1 day".to_string(),
            )),
            Window::Days(n) => {
                let since = today
                    .checked_sub_days(Days::new(u64::from(n - 1)))
                    .unwrap_or(NaiveDate::MIN);
                Ok(DateFilter::between(Some(since), Some(today)))
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Days(1) => write!(f, "last 1 day"),
            Window::Days(n) => write!(f, "last {} days", n),
            Window::AllTime => write!(f, "all time"),
        }
    }
}

impl FromStr for Window {
    type Err = String;

    /// Parses `all` or a positive day count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Window::AllTime);
        }
        match s.parse::<u32>() {
            Ok(0) => Err("window must cover at least 1 day".to_string()),
            Ok(n) => Ok(Window::Days(n)),
            Err(_) => Err(format!(
                "invalid window '{}': use a number of days or 'all'",
                s
            )),
        }
    }
}

/// Returns entries within `filter`, oldest first.
///
/// Entries sharing a timestamp keep their insertion order; id breaks any
/// remaining tie.
pub fn list<'a, E: Timestamped>(entries: &'a [E], filter: &DateFilter) -> Vec<&'a E> {
    let mut matched: Vec<(usize, &E)> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| filter.contains(entry.local_date()))
        .collect();

    matched.sort_by(|(index_a, a), (index_b, b)| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then(index_a.cmp(index_b))
            .then_with(|| a.id().cmp(&b.id()))
    });

    matched.into_iter().map(|(_, entry)| entry).collect()
}

/// Returns entries on the local calendar day of `now`, newest first.
pub fn today<E: Timestamped>(entries: &[E], now: DateTime<Local>) -> Vec<&E> {
    let mut todays = list(entries, &DateFilter::on(now.date_naive()));
    todays.reverse();
    todays
}

/// Returns the most recent `limit` entries within `filter`, newest first.
pub fn recent<'a, E: Timestamped>(
    entries: &'a [E],
    filter: &DateFilter,
    limit: usize,
) -> Vec<&'a E> {
    let mut matched = list(entries, filter);
    matched.reverse();
    matched.truncate(limit);
    matched
}

/// Returns the entry with the latest timestamp.
pub fn latest<E: Timestamped>(entries: &[E]) -> Option<&E> {
    list(entries, &DateFilter::all()).pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{MoodEntry, WaterEntry};
    use chrono::{FixedOffset, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        local(y, m, d, h, min).fixed_offset()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mood(ts: DateTime<FixedOffset>, score: i64) -> MoodEntry {
        MoodEntry::new(ts, score).unwrap()
    }

    #[test]
    fn test_list_orders_by_timestamp() {
        let moods = vec![
            mood(at(2026, 2, 25, 9, 0), 5),
            mood(at(2026, 2, 24, 9, 0), 6),
            mood(at(2026, 2, 25, 7, 0), 7),
        ];

        let scores: Vec<u8> = list(&moods, &DateFilter::all())
            .iter()
            .map(|m| m.score)
            .collect();
        assert_eq!(scores, vec![6, 7, 5]);
    }

    #[test]
    fn test_list_ties_keep_insertion_order() {
        let ts = at(2026, 2, 25, 9, 0);
        let moods = vec![mood(ts, 3), mood(ts, 8), mood(ts, 5)];

        let scores: Vec<u8> = list(&moods, &DateFilter::all())
            .iter()
            .map(|m| m.score)
            .collect();
        assert_eq!(scores, vec![3, 8, 5]);
    }

    #[test]
    fn test_list_filter_bounds_are_inclusive() {
        let moods = vec![
            mood(at(2026, 2, 23, 23, 59), 1),
            mood(at(2026, 2, 24, 0, 0), 2),
            mood(at(2026, 2, 25, 23, 59), 3),
            mood(at(2026, 2, 26, 0, 0), 4),
        ];

        let filter = DateFilter::between(Some(date(2026, 2, 24)), Some(date(2026, 2, 25)));
        let scores: Vec<u8> = list(&moods, &filter).iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![2, 3]);
    }

    #[test]
    fn test_today_includes_midnight_excludes_yesterday() {
        let now = local(2026, 2, 25, 12, 0);
        let moods = vec![
            mood(at(2026, 2, 24, 23, 59), 1),
            mood(at(2026, 2, 25, 0, 0), 2),
            mood(at(2026, 2, 25, 11, 0), 3),
        ];

        let scores: Vec<u8> = today(&moods, now).iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![3, 2]);
    }

    #[test]
    fn test_recent_limits_newest_first() {
        let water: Vec<WaterEntry> = (1..=5)
            .map(|day| WaterEntry::new(at(2026, 2, day, 8, 0), day).unwrap())
            .collect();

        let ounces: Vec<u32> = recent(&water, &DateFilter::all(), 2)
            .iter()
            .map(|w| w.ounces)
            .collect();
        assert_eq!(ounces, vec![5, 4]);
    }

    #[test]
    fn test_latest() {
        let moods = vec![
            mood(at(2026, 2, 25, 9, 0), 5),
            mood(at(2026, 2, 25, 21, 0), 8),
            mood(at(2026, 2, 24, 22, 0), 2),
        ];
        assert_eq!(latest(&moods).map(|m| m.score), Some(8));
        assert!(latest::<MoodEntry>(&[]).is_none());
    }

    #[test]
    fn test_window_filter() {
        let today = date(2026, 2, 25);

        let filter = Window::Days(7).filter(today).unwrap();
        assert_eq!(filter.from, Some(date(2026, 2, 19)));
        assert_eq!(filter.to, Some(today));

        assert_eq!(
            Window::Days(1).filter(today).unwrap(),
            DateFilter::on(today)
        );
        assert_eq!(Window::AllTime.filter(today).unwrap(), DateFilter::all());
        assert!(matches!(
            Window::Days(0).filter(today),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_window_from_str() {
        assert_eq!("7".parse::<Window>(), Ok(Window::Days(7)));
        assert_eq!("ALL".parse::<Window>(), Ok(Window::AllTime));
        assert!("0".parse::<Window>().is_err());
        assert!("-3".parse::<Window>().is_err());
        assert!("week".parse::<Window>().is_err());
        assert_eq!(Window::Days(30).to_string(), "last 30 days");
    }
}
