//! Record schema for the journal document.
//!
//! Defines the entries users log (mood, medication, water) and the
//! `DataDocument` that holds them on disk. Deserialization is strict: unknown
//! fields are rejected at every level and `DataDocument::validate` enforces the
//! invariants serde cannot express (score scale, unique ids, schema version).

use crate::constants::{MOOD_SCORE_MAX, MOOD_SCORE_MIN, SCHEMA_VERSION};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Common view over every kind of logged entry.
///
/// Query and stats operations are written against this trait so they work the
/// same way for moods, medications and water.
pub trait Timestamped {
    /// The entry's immutable identifier.
    fn id(&self) -> Uuid;

    /// The absolute point in time the entry refers to.
    fn timestamp(&self) -> DateTime<FixedOffset>;

    /// The calendar date of the entry in the local timezone.
    fn local_date(&self) -> NaiveDate {
        self.timestamp().with_timezone(&Local).date_naive()
    }
}

/// A single mood observation, optionally carrying last night's sleep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoodEntry {
    pub id: Uuid,
    #[serde(with = "rfc3339_seconds")]
    pub timestamp: DateTime<FixedOffset>,
    /// Score on the 1-10 scale.
    pub score: u8,
    pub tags: Vec<String>,
    /// Total sleep in minutes.
    pub sleep_total: Option<u32>,
    /// REM sleep in minutes.
    pub sleep_rem: Option<u32>,
    /// Deep sleep in minutes.
    pub sleep_deep: Option<u32>,
    pub notes: Option<String>,
}

impl MoodEntry {
    /// Creates a mood entry with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `score` is outside the 1-10 scale.
    ///
    /// # Examples
    ///
    /// ```
    /// use chaoscatcher::records::MoodEntry;
    /// use chrono::DateTime;
    ///
    /// let ts = DateTime::parse_from_rfc3339("2026-02-25T07:34:00-05:00").unwrap();
    /// let entry = MoodEntry::new(ts, 7).unwrap().with_tags(vec!["baseline".into()]);
    /// assert_eq!(entry.score, 7);
    ///
    /// assert!(MoodEntry::new(ts, 11).is_err());
    /// ```
    pub fn new(timestamp: DateTime<FixedOffset>, score: i64) -> AppResult<Self> {
        Ok(MoodEntry {
            id: Uuid::new_v4(),
            timestamp: truncate_subsec(timestamp),
            score: validate_score(score)?,
            tags: Vec::new(),
            sleep_total: None,
            sleep_rem: None,
            sleep_deep: None,
            notes: None,
        })
    }

    /// Replaces the tags, dropping blanks and case-insensitive duplicates.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = normalize_tags(tags);
        self
    }

    /// Sets the sleep durations, all in minutes.
    pub fn with_sleep(mut self, total: Option<u32>, rem: Option<u32>, deep: Option<u32>) -> Self {
        self.sleep_total = total;
        self.sleep_rem = rem;
        self.sleep_deep = deep;
        self
    }

    /// Sets the notes; blank notes are stored as absent.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = clean_text(notes);
        self
    }

    fn validate(&self) -> AppResult<()> {
        validate_score(i64::from(self.score)).map(|_| ())
    }
}

impl Timestamped for MoodEntry {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

/// A single medication dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicationEntry {
    pub id: Uuid,
    #[serde(with = "rfc3339_seconds")]
    pub timestamp: DateTime<FixedOffset>,
    pub name: String,
    /// Free-form dose such as "50 mg"; never parsed numerically.
    pub dose: String,
    pub notes: Option<String>,
}

impl MedicationEntry {
    /// Creates a medication entry with a fresh id.
    ///
    /// The name is trimmed before storing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the name is empty after trimming.
    pub fn new(timestamp: DateTime<FixedOffset>, name: &str, dose: &str) -> AppResult<Self> {
        let entry = MedicationEntry {
            id: Uuid::new_v4(),
            timestamp: truncate_subsec(timestamp),
            name: name.trim().to_string(),
            dose: dose.trim().to_string(),
            notes: None,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Sets the notes; blank notes are stored as absent.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = clean_text(notes);
        self
    }

    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "medication {} has an empty name",
                self.id
            )));
        }
        Ok(())
    }
}

impl Timestamped for MedicationEntry {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

/// A glass (or bottle) of water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaterEntry {
    pub id: Uuid,
    #[serde(with = "rfc3339_seconds")]
    pub timestamp: DateTime<FixedOffset>,
    pub ounces: u32,
}

impl WaterEntry {
    /// Creates a water entry with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `ounces` is zero.
    pub fn new(timestamp: DateTime<FixedOffset>, ounces: u32) -> AppResult<Self> {
        let entry = WaterEntry {
            id: Uuid::new_v4(),
            timestamp: truncate_subsec(timestamp),
            ounces,
        };
        entry.validate()?;
        Ok(entry)
    }

    fn validate(&self) -> AppResult<()> {
        if self.ounces == 0 {
            return Err(AppError::Validation(format!(
                "water entry {} must be at least 1 oz",
                self.id
            )));
        }
        Ok(())
    }
}

impl Timestamped for WaterEntry {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

/// The full on-disk document.
///
/// Collections are append-only: entries can be added and read, never edited
/// or removed. Insertion order is preserved; queries sort by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataDocument {
    version: u32,
    moods: Vec<MoodEntry>,
    medications: Vec<MedicationEntry>,
    #[serde(default)]
    water: Vec<WaterEntry>,
}

impl Default for DataDocument {
    fn default() -> Self {
        DataDocument {
            version: SCHEMA_VERSION,
            moods: Vec::new(),
            medications: Vec::new(),
            water: Vec::new(),
        }
    }
}

impl DataDocument {
    /// Creates an empty document at the current schema version.
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema version recorded in the document.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Mood entries in insertion order.
    pub fn moods(&self) -> &[MoodEntry] {
        &self.moods
    }

    /// Medication entries in insertion order.
    pub fn medications(&self) -> &[MedicationEntry] {
        &self.medications
    }

    /// Water entries in insertion order.
    pub fn water(&self) -> &[WaterEntry] {
        &self.water
    }

    /// Appends a mood entry after checking it against the document invariants.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the entry is invalid or its id is
    /// already present.
    pub fn append_mood(&mut self, entry: MoodEntry) -> AppResult<()> {
        entry.validate()?;
        ensure_new_id(&self.moods, entry.id, "mood")?;
        self.moods.push(entry);
        Ok(())
    }

    /// Appends a medication entry after checking it against the document invariants.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the entry is invalid or its id is
    /// already present.
    pub fn append_medication(&mut self, entry: MedicationEntry) -> AppResult<()> {
        entry.validate()?;
        ensure_new_id(&self.medications, entry.id, "medication")?;
        self.medications.push(entry);
        Ok(())
    }

    /// Appends a water entry after checking it against the document invariants.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the entry is invalid or its id is
    /// already present.
    pub fn append_water(&mut self, entry: WaterEntry) -> AppResult<()> {
        entry.validate()?;
        ensure_new_id(&self.water, entry.id, "water")?;
        self.water.push(entry);
        Ok(())
    }

    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the version is unsupported, any entry
    /// violates its constraints, or an id repeats within a collection.
    pub fn validate(&self) -> AppResult<()> {
        if self.version != SCHEMA_VERSION {
            return Err(AppError::Validation(format!(
                "unsupported schema version {} (expected {})",
                self.version, SCHEMA_VERSION
            )));
        }

        for mood in &self.moods {
            mood.validate()?;
        }
        for med in &self.medications {
            med.validate()?;
        }
        for water in &self.water {
            water.validate()?;
        }

        ensure_unique_ids(&self.moods, "mood")?;
        ensure_unique_ids(&self.medications, "medication")?;
        ensure_unique_ids(&self.water, "water")?;
        Ok(())
    }
}

/// Splits raw tag text on commas and whitespace.
///
/// Blank chunks are dropped and duplicates are removed case-insensitively,
/// keeping the first spelling seen.
///
/// # Examples
///
/// ```
/// use chaoscatcher::records::parse_tags;
///
/// assert_eq!(parse_tags("baseline, school Baseline"), vec!["baseline", "school"]);
/// assert!(parse_tags("  ,, ").is_empty());
/// ```
pub fn parse_tags(raw: &str) -> Vec<String> {
    normalize_tags(
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .map(str::to_string)
            .collect(),
    )
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

fn validate_score(score: i64) -> AppResult<u8> {
    if !(MOOD_SCORE_MIN..=MOOD_SCORE_MAX).contains(&score) {
        return Err(AppError::Validation(format!(
            "mood score {} is outside the {}-{} scale",
            score, MOOD_SCORE_MIN, MOOD_SCORE_MAX
        )));
    }
    // Within 1..=10, so the conversion cannot truncate.
    Ok(score as u8)
}

fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn truncate_subsec(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.with_nanosecond(0).unwrap_or(ts)
}

fn ensure_new_id<E: Timestamped>(entries: &[E], id: Uuid, kind: &str) -> AppResult<()> {
    if entries.iter().any(|e| e.id() == id) {
        return Err(AppError::Validation(format!("duplicate {} id {}", kind, id)));
    }
    Ok(())
}

fn ensure_unique_ids<E: Timestamped>(entries: &[E], kind: &str) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.id()) {
            return Err(AppError::Validation(format!(
                "duplicate {} id {}",
                kind,
                entry.id()
            )));
        }
    }
    Ok(())
}

/// Serializes timestamps as RFC 3339 with seconds precision and a numeric offset.
mod rfc3339_seconds {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e))
        })
    }
}
