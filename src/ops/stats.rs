//! Rolling statistics over mood and medication entries.
//!
//! This module provides the numbers behind `mood stats`, `med stats`, the
//! summary and the daily CSV export:
//! - Mood: count, mean, longest streak, per-day rollups, trend, distribution, tags
//! - Medication: doses per name, average gap between doses, common dose hours
//!
//! Means over empty windows are `None`, never a division by zero.

use crate::constants::{DAILY_TOP_TAGS_LIMIT, TOP_HOURS_LIMIT, TOP_TAGS_LIMIT};
use crate::errors::{AppError, AppResult};
use crate::ops::query::{list, DateFilter, Window};
use crate::records::{MedicationEntry, MoodEntry, Timestamped};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Timelike};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Mood rollup for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMood {
    pub date: NaiveDate,
    pub count: usize,
    pub mean: f64,
    pub min: u8,
    pub max: u8,
    /// Mean total sleep in minutes over the entries that recorded it.
    pub mean_sleep_total: Option<f64>,
    pub mean_sleep_rem: Option<f64>,
    pub mean_sleep_deep: Option<f64>,
    /// Most frequent tags of the day, most common first.
    pub top_tags: Vec<TagCount>,
}

/// A tag and how often it was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Direction of the mood trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Least-squares fit over daily mean scores.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodTrend {
    /// Change in mean score per day.
    pub slope_per_day: f64,
    /// Last daily mean minus first daily mean.
    pub net_change: f64,
    pub direction: TrendDirection,
}

/// Result of `mood_stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodStats {
    pub window: Window,
    pub count: usize,
    /// Arithmetic mean of all scores in the window, `None` when empty.
    pub mean: Option<f64>,
    /// Longest run of consecutive days with at least one entry.
    pub longest_streak: u32,
    /// Per-day rollups, oldest first.
    pub daily: Vec<DailyMood>,
    /// `None` with fewer than two days of data.
    pub trend: Option<MoodTrend>,
    /// Entry count per score; index 0 holds score 1.
    pub distribution: [usize; 10],
    pub top_tags: Vec<TagCount>,
}

impl MoodStats {
    /// The day with the highest mean; earliest wins ties.
    pub fn best_day(&self) -> Option<&DailyMood> {
        self.daily
            .iter()
            .fold(None, |best: Option<&DailyMood>, day| match best {
                Some(b) if b.mean >= day.mean => Some(b),
                _ => Some(day),
            })
    }

    /// The day with the lowest mean; earliest wins ties.
    pub fn worst_day(&self) -> Option<&DailyMood> {
        self.daily
            .iter()
            .fold(None, |worst: Option<&DailyMood>, day| match worst {
                Some(w) if w.mean <= day.mean => Some(w),
                _ => Some(day),
            })
    }
}

/// Doses of one medication within the window.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationSummary {
    pub name: String,
    pub count: usize,
    /// Mean hours between consecutive doses, `None` with fewer than two.
    pub average_gap_hours: Option<f64>,
    pub last_taken: DateTime<FixedOffset>,
}

/// An hour of the day and how many doses were taken in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourCount {
    pub hour: u32,
    pub count: usize,
}

/// Result of `medication_stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationStats {
    pub days: u32,
    /// One summary per distinct name, sorted by name.
    pub medications: Vec<MedicationSummary>,
    /// Most common local dose hours across all medications.
    pub common_hours: Vec<HourCount>,
}

/// Computes mood statistics over a trailing window.
///
/// # Arguments
///
/// * `moods` - Mood entries in any order
/// * `window` - Trailing day count (today included) or all time
/// * `now` - Reference point for "today"
/// * `trend_epsilon` - Slope magnitude (points per day) below which the trend is stable
///
/// # Errors
///
/// Returns `AppError::Validation` if the window is zero days or
/// `trend_epsilon` is negative or not finite.
///
/// # Examples
///
/// ```
/// use chaoscatcher::ops::{mood_stats, Window};
/// use chaoscatcher::records::MoodEntry;
/// use chrono::Local;
///
/// let now = Local::now();
/// let moods = vec![
///     MoodEntry::new(now.fixed_offset(), 6).unwrap(),
///     MoodEntry::new(now.fixed_offset(), 8).unwrap(),
/// ];
///
/// let stats = mood_stats(&moods, Window::Days(7), now, 0.05).unwrap();
/// assert_eq!(stats.count, 2);
/// assert_eq!(stats.mean, Some(7.0));
/// assert_eq!(stats.longest_streak, 1);
/// ```
pub fn mood_stats(
    moods: &[MoodEntry],
    window: Window,
    now: DateTime<Local>,
    trend_epsilon: f64,
) -> AppResult<MoodStats> {
    if !trend_epsilon.is_finite() || trend_epsilon < 0.0 {
        return Err(AppError::Validation(format!(
            "trend epsilon must be a non-negative number, got {}",
            trend_epsilon
        )));
    }

    let filter = window.filter(now.date_naive())?;
    let in_window = list(moods, &filter);
    debug!(window = %window, entries = in_window.len(), "Computing mood stats");

    let count = in_window.len();
    let mean = mean_of(in_window.iter().map(|m| f64::from(m.score)));

    let mut distribution = [0usize; 10];
    for mood in &in_window {
        if let Some(slot) = distribution.get_mut(usize::from(mood.score).saturating_sub(1)) {
            *slot += 1;
        }
    }

    let daily = rollup_days(&in_window);
    let longest_streak = longest_streak(daily.iter().map(|d| d.date));
    let trend = fit_trend(&daily, trend_epsilon);
    let top_tags = count_tags(&in_window)
        .into_iter()
        .take(TOP_TAGS_LIMIT)
        .collect();

    Ok(MoodStats {
        window,
        count,
        mean,
        longest_streak,
        daily,
        trend,
        distribution,
        top_tags,
    })
}

/// Groups moods within `filter` into per-day rollups, oldest first.
pub fn daily_moods(moods: &[MoodEntry], filter: &DateFilter) -> Vec<DailyMood> {
    rollup_days(&list(moods, filter))
}

/// Computes per-medication dose statistics over the trailing `days`.
///
/// Doses are grouped by their trimmed name.
///
/// # Errors
///
/// Returns `AppError::Validation` if `days` is zero.
pub fn medication_stats(
    meds: &[MedicationEntry],
    days: u32,
    now: DateTime<Local>,
) -> AppResult<MedicationStats> {
    let filter = Window::Days(days).filter(now.date_naive())?;
    let in_window = list(meds, &filter);
    debug!(days, doses = in_window.len(), "Computing medication stats");

    let mut by_name: BTreeMap<&str, Vec<DateTime<FixedOffset>>> = BTreeMap::new();
    let mut by_hour: HashMap<u32, usize> = HashMap::new();
    for med in &in_window {
        by_name
            .entry(med.name.trim())
            .or_default()
            .push(med.timestamp());
        *by_hour
            .entry(med.timestamp().with_timezone(&Local).hour())
            .or_insert(0) += 1;
    }

    let medications = by_name
        .into_iter()
        .filter_map(|(name, doses)| {
            let last_taken = *doses.last()?;
            Some(MedicationSummary {
                name: name.to_string(),
                count: doses.len(),
                average_gap_hours: average_gap_hours(&doses),
                last_taken,
            })
        })
        .collect();

    let mut common_hours: Vec<HourCount> = by_hour
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect();
    common_hours.sort_by(|a, b| b.count.cmp(&a.count).then(a.hour.cmp(&b.hour)));
    common_hours.truncate(TOP_HOURS_LIMIT);

    Ok(MedicationStats {
        days,
        medications,
        common_hours,
    })
}

/// Length of the longest run of consecutive calendar days.
fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let unique: BTreeSet<NaiveDate> = dates.into_iter().collect();

    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in unique {
        current = match previous.and_then(|p| p.succ_opt()) {
            Some(next) if next == date => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }
    longest
}

fn rollup_days(moods: &[&MoodEntry]) -> Vec<DailyMood> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&MoodEntry>> = BTreeMap::new();
    for &mood in moods {
        by_day.entry(mood.local_date()).or_default().push(mood);
    }

    by_day
        .into_iter()
        .filter_map(|(date, entries)| {
            let scores = entries.iter().map(|m| m.score);
            Some(DailyMood {
                date,
                count: entries.len(),
                mean: mean_of(entries.iter().map(|m| f64::from(m.score)))?,
                min: scores.clone().min()?,
                max: scores.max()?,
                mean_sleep_total: mean_sleep(&entries, |m| m.sleep_total),
                mean_sleep_rem: mean_sleep(&entries, |m| m.sleep_rem),
                mean_sleep_deep: mean_sleep(&entries, |m| m.sleep_deep),
                top_tags: count_tags(&entries)
                    .into_iter()
                    .take(DAILY_TOP_TAGS_LIMIT)
                    .collect(),
            })
        })
        .collect()
}

/// Mean of one sleep field over the entries that recorded it.
fn mean_sleep(
    entries: &[&MoodEntry],
    field: impl Fn(&MoodEntry) -> Option<u32>,
) -> Option<f64> {
    mean_of(entries.iter().filter_map(|m| field(m)).map(f64::from))
}

/// Tag usage counts, most common first, ties alphabetical.
fn count_tags(moods: &[&MoodEntry]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for mood in moods {
        for tag in &mood.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

fn fit_trend(daily: &[DailyMood], epsilon: f64) -> Option<MoodTrend> {
    let (first, last) = (daily.first()?, daily.last()?);
    if daily.len() < 2 {
        return None;
    }

    // x is days since the first day with data, so gaps weigh correctly.
    let points: Vec<(f64, f64)> = daily
        .iter()
        .map(|d| ((d.date - first.date).num_days() as f64, d.mean))
        .collect();
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let covariance: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let variance: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let slope = if variance > 0.0 {
        covariance / variance
    } else {
        0.0
    };

    let direction = if slope > epsilon {
        TrendDirection::Improving
    } else if slope < -epsilon {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    Some(MoodTrend {
        slope_per_day: slope,
        net_change: last.mean - first.mean,
        direction,
    })
}

fn average_gap_hours(doses: &[DateTime<FixedOffset>]) -> Option<f64> {
    let (first, last) = (doses.first()?, doses.last()?);
    if doses.len() < 2 {
        return None;
    }
    let span_hours = (*last - *first).num_seconds() as f64 / 3600.0;
    Some(span_hours / (doses.len() - 1) as f64)
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
