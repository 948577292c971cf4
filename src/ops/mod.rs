//! High-level operations over the journal.
//!
//! This module provides the operations behind every command: appending
//! entries, listing and filtering them, rolling statistics, the daily
//! summary, CSV exports and the data file health check. Apart from the
//! append operations and exports, everything here is a pure function of the
//! loaded document and an explicit `now`.

pub mod add;
pub mod doctor;
pub mod export;
pub mod query;
pub mod stats;
pub mod summary;

// Re-export commonly used functions
pub use add::{add_medication, add_mood, add_water};
pub use doctor::{run_doctor, DoctorReport, EntryCounts};
pub use export::{
    export_daily_moods_csv, export_medications_csv, export_moods_csv, export_water_csv,
};
pub use query::{latest, list, recent, today, DateFilter, Window};
pub use stats::{
    daily_moods, medication_stats, mood_stats, DailyMood, HourCount, MedicationStats,
    MedicationSummary, MoodStats, MoodTrend, TagCount, TrendDirection,
};
pub use summary::{summary, total_ounces, Summary, TodayCounts};
