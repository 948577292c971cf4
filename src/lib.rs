/*!
# ChaosCatcher

ChaosCatcher is a local self-care journal. It records timestamped mood,
medication and water entries (sleep rides along on mood entries) into a
single JSON file and answers read queries over it: listings, today's view,
rolling statistics, a summary and CSV exports.

## Architecture

The codebase follows a modular architecture with clear separation of concerns:

- `timeparse`: Human time expressions and clock durations
- `records`: Entry types and the on-disk document schema
- `config`: Data file path resolution
- `safety`: Guard against keeping the data file inside a git repository
- `store`: Loading, validating and atomically saving the document
- `ops`: Append operations, queries, statistics, summary and exports
- `cli` / `display`: Argument parsing and plain-text rendering for the binary
- `errors` / `constants`: Shared error types and constants

## Usage Example

```rust,no_run
use chaoscatcher::{Config, ops};
use chaoscatcher::records::MoodEntry;
use chaoscatcher::timeparse::parse_timestamp;
use chrono::Local;

fn main() -> chaoscatcher::AppResult<()> {
    let now = Local::now();
    let store = Config::load(None, Some("dev"), false)?.store();
    store.init()?;

    let entry = MoodEntry::new(parse_timestamp("yesterday 9pm", now)?, 7)?;
    ops::add_mood(&store, entry)?;

    let doc = store.load()?;
    let stats = ops::mood_stats(doc.moods(), ops::Window::Days(7), now, 0.05)?;
    println!("mean mood this week: {:?}", stats.mean);
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Data file path resolution
pub mod config;
/// Application-wide constants
pub mod constants;
/// Plain-text rendering for the command surface
pub mod display;
/// Error types and utilities for error handling
pub mod errors;
/// Operations over the journal
pub mod ops;
/// Record schema
pub mod records;
/// Git repository guard
pub mod safety;
/// Persistence
pub mod store;
/// Time and duration parsing
pub mod timeparse;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use records::{DataDocument, MedicationEntry, MoodEntry, WaterEntry};
pub use store::DataStore;
