//! Append operations.
//!
//! Each operation reloads the document right before appending and saves it
//! atomically. Validation happens before anything is written, so a rejected
//! entry leaves the data file byte-for-byte unchanged.

use crate::errors::AppResult;
use crate::records::{MedicationEntry, MoodEntry, WaterEntry};
use crate::store::DataStore;
use tracing::info;

/// Appends a mood entry and persists the document.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or saved, or if the entry
/// is rejected by the document (`AppError::Validation`).
pub fn add_mood(store: &DataStore, entry: MoodEntry) -> AppResult<MoodEntry> {
    let stored = store.update(move |doc| {
        doc.append_mood(entry.clone())?;
        Ok(entry)
    })?;
    info!(id = %stored.id, score = stored.score, "Logged mood");
    Ok(stored)
}

/// Appends a medication entry and persists the document.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or saved, or if the entry
/// is rejected by the document (`AppError::Validation`).
pub fn add_medication(store: &DataStore, entry: MedicationEntry) -> AppResult<MedicationEntry> {
    let stored = store.update(move |doc| {
        doc.append_medication(entry.clone())?;
        Ok(entry)
    })?;
    info!(id = %stored.id, name = %stored.name, "Logged medication");
    Ok(stored)
}

/// Appends a water entry and persists the document.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or saved, or if the entry
/// is rejected by the document (`AppError::Validation`).
pub fn add_water(store: &DataStore, entry: WaterEntry) -> AppResult<WaterEntry> {
    let stored = store.update(move |doc| {
        doc.append_water(entry.clone())?;
        Ok(entry)
    })?;
    info!(id = %stored.id, ounces = stored.ounces, "Logged water");
    Ok(stored)
}
