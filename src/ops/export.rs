//! CSV exports.
//!
//! Each export writes a header row with a fixed column set followed by one
//! row per entry (or per day for the daily rollup), oldest first. The target
//! file is overwritten and missing parent directories are created. Date and
//! time columns use the local timezone; `ts` keeps the stored offset.

use crate::constants::{CSV_TIME_FORMAT, DATE_FORMAT_ISO};
use crate::errors::AppResult;
use crate::ops::query::{list, Window};
use crate::ops::stats::daily_moods;
use crate::records::{MedicationEntry, MoodEntry, Timestamped, WaterEntry};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Columns of the mood export.
pub const MOOD_COLUMNS: [&str; 12] = [
    "id",
    "ts",
    "date",
    "time",
    "timezone",
    "weekday",
    "score",
    "sleep_total_min",
    "sleep_rem_min",
    "sleep_deep_min",
    "tags",
    "notes",
];

/// Columns of the daily mood export.
pub const MOOD_DAILY_COLUMNS: [&str; 10] = [
    "date",
    "weekday",
    "avg_score",
    "min_score",
    "max_score",
    "entries",
    "avg_sleep_total_min",
    "avg_sleep_rem_min",
    "avg_sleep_deep_min",
    "top_tags",
];

/// Columns of the medication export.
pub const MEDICATION_COLUMNS: [&str; 7] = ["id", "ts", "date", "time", "name", "dose", "notes"];

/// Columns of the water export.
pub const WATER_COLUMNS: [&str; 5] = ["id", "ts", "date", "time", "ounces"];

#[derive(Serialize)]
struct MoodRow<'a> {
    id: String,
    ts: String,
    date: String,
    time: String,
    timezone: String,
    weekday: String,
    score: u8,
    sleep_total_min: Option<u32>,
    sleep_rem_min: Option<u32>,
    sleep_deep_min: Option<u32>,
    tags: String,
    notes: &'a str,
}

#[derive(Serialize)]
struct MoodDailyRow {
    date: String,
    weekday: String,
    avg_score: String,
    min_score: u8,
    max_score: u8,
    entries: usize,
    avg_sleep_total_min: Option<String>,
    avg_sleep_rem_min: Option<String>,
    avg_sleep_deep_min: Option<String>,
    top_tags: String,
}

#[derive(Serialize)]
struct MedicationRow<'a> {
    id: String,
    ts: String,
    date: String,
    time: String,
    name: &'a str,
    dose: &'a str,
    notes: &'a str,
}

#[derive(Serialize)]
struct WaterRow {
    id: String,
    ts: String,
    date: String,
    time: String,
    ounces: u32,
}

/// Timestamp columns shared by the per-entry exports.
struct Stamp {
    ts: String,
    date: String,
    time: String,
    timezone: String,
    weekday: String,
}

impl Stamp {
    fn of(timestamp: DateTime<FixedOffset>) -> Self {
        let local = timestamp.with_timezone(&Local);
        Stamp {
            ts: timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            date: local.format(DATE_FORMAT_ISO).to_string(),
            time: local.format(CSV_TIME_FORMAT).to_string(),
            timezone: local.format("%:z").to_string(),
            weekday: local.format("%a").to_string(),
        }
    }
}

/// Writes mood entries within `window` to `path`.
///
/// Returns the number of data rows written.
///
/// # Errors
///
/// Returns an error if the window is invalid or the file cannot be written.
pub fn export_moods_csv(
    moods: &[MoodEntry],
    path: &Path,
    window: Window,
    now: DateTime<Local>,
) -> AppResult<usize> {
    let filter = window.filter(now.date_naive())?;
    let rows = list(moods, &filter).into_iter().map(|mood| {
        let stamp = Stamp::of(mood.timestamp());
        MoodRow {
            id: mood.id.to_string(),
            ts: stamp.ts,
            date: stamp.date,
            time: stamp.time,
            timezone: stamp.timezone,
            weekday: stamp.weekday,
            score: mood.score,
            sleep_total_min: mood.sleep_total,
            sleep_rem_min: mood.sleep_rem,
            sleep_deep_min: mood.sleep_deep,
            tags: mood.tags.join(","),
            notes: mood.notes.as_deref().unwrap_or(""),
        }
    });
    write_csv(path, &MOOD_COLUMNS, rows)
}

/// Writes one row per day of mood data within `window` to `path`.
///
/// Returns the number of days written.
///
/// # Errors
///
/// Returns an error if the window is invalid or the file cannot be written.
pub fn export_daily_moods_csv(
    moods: &[MoodEntry],
    path: &Path,
    window: Window,
    now: DateTime<Local>,
) -> AppResult<usize> {
    let filter = window.filter(now.date_naive())?;
    let rows = daily_moods(moods, &filter).into_iter().map(|day| MoodDailyRow {
        date: day.date.format(DATE_FORMAT_ISO).to_string(),
        weekday: day.date.format("%a").to_string(),
        avg_score: format!("{:.2}", day.mean),
        min_score: day.min,
        max_score: day.max,
        entries: day.count,
        avg_sleep_total_min: day.mean_sleep_total.map(whole_minutes),
        avg_sleep_rem_min: day.mean_sleep_rem.map(whole_minutes),
        avg_sleep_deep_min: day.mean_sleep_deep.map(whole_minutes),
        top_tags: day
            .top_tags
            .iter()
            .map(|t| format!("{}({})", t.tag, t.count))
            .collect::<Vec<_>>()
            .join(","),
    });
    write_csv(path, &MOOD_DAILY_COLUMNS, rows)
}

fn whole_minutes(minutes: f64) -> String {
    format!("{:.0}", minutes)
}

/// Writes medication entries within `window` to `path`.
///
/// Returns the number of data rows written.
///
/// # Errors
///
/// Returns an error if the window is invalid or the file cannot be written.
pub fn export_medications_csv(
    meds: &[MedicationEntry],
    path: &Path,
    window: Window,
    now: DateTime<Local>,
) -> AppResult<usize> {
    let filter = window.filter(now.date_naive())?;
    let rows = list(meds, &filter).into_iter().map(|med| {
        let stamp = Stamp::of(med.timestamp());
        MedicationRow {
            id: med.id.to_string(),
            ts: stamp.ts,
            date: stamp.date,
            time: stamp.time,
            name: &med.name,
            dose: &med.dose,
            notes: med.notes.as_deref().unwrap_or(""),
        }
    });
    write_csv(path, &MEDICATION_COLUMNS, rows)
}

/// Writes water entries within `window` to `path`.
///
/// Returns the number of data rows written.
///
/// # Errors
///
/// Returns an error if the window is invalid or the file cannot be written.
pub fn export_water_csv(
    water: &[WaterEntry],
    path: &Path,
    window: Window,
    now: DateTime<Local>,
) -> AppResult<usize> {
    let filter = window.filter(now.date_naive())?;
    let rows = list(water, &filter).into_iter().map(|entry| {
        let stamp = Stamp::of(entry.timestamp());
        WaterRow {
            id: entry.id.to_string(),
            ts: stamp.ts,
            date: stamp.date,
            time: stamp.time,
            ounces: entry.ounces,
        }
    });
    write_csv(path, &WATER_COLUMNS, rows)
}

fn write_csv<R, I>(path: &Path, header: &[&str], rows: I) -> AppResult<usize>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Header is written by hand so empty exports still carry it.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;

    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = count, "Exported CSV");
    Ok(count)
}
