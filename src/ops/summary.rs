//! At-a-glance summary of the journal.

use crate::constants::SUMMARY_MOOD_DAYS;
use crate::ops::query::{latest, today, DateFilter};
use crate::ops::stats::{daily_moods, DailyMood};
use crate::records::{DataDocument, MedicationEntry, MoodEntry, WaterEntry};
use chrono::{DateTime, Local, NaiveDate};

/// Counts for the current local day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodayCounts {
    pub moods: usize,
    pub medications: usize,
    pub water_entries: usize,
    pub water_ounces: u64,
}

/// Snapshot returned by `summary`.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub date: NaiveDate,
    pub latest_mood: Option<MoodEntry>,
    pub latest_medication: Option<MedicationEntry>,
    pub today: TodayCounts,
    /// Today's medication doses, newest first.
    pub todays_medications: Vec<MedicationEntry>,
    /// Daily mood means for the most recent days with data, oldest first.
    pub recent_daily_moods: Vec<DailyMood>,
}

/// Builds the summary for the local day of `now`.
///
/// Recent daily moods never include days after today.
pub fn summary(document: &DataDocument, now: DateTime<Local>) -> Summary {
    let date = now.date_naive();

    let todays_water = today(document.water(), now);
    let todays_medications: Vec<MedicationEntry> = today(document.medications(), now)
        .into_iter()
        .cloned()
        .collect();

    let counts = TodayCounts {
        moods: today(document.moods(), now).len(),
        medications: todays_medications.len(),
        water_entries: todays_water.len(),
        water_ounces: total_ounces(&todays_water),
    };

    let up_to_today = DateFilter::between(None, Some(date));
    let mut recent_daily_moods = daily_moods(document.moods(), &up_to_today);
    let skip = recent_daily_moods.len().saturating_sub(SUMMARY_MOOD_DAYS);
    recent_daily_moods.drain(..skip);

    Summary {
        date,
        latest_mood: latest(document.moods()).cloned(),
        latest_medication: latest(document.medications()).cloned(),
        today: counts,
        todays_medications,
        recent_daily_moods,
    }
}

/// Total ounces across `entries`, widened so large logs cannot overflow.
pub fn total_ounces(entries: &[&WaterEntry]) -> u64 {
    entries.iter().map(|w| u64::from(w.ounces)).sum()
}
