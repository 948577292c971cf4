//! Constants used throughout the application.
//!
//! This module contains all constants used in the ChaosCatcher application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "chaoscatcher";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "ChaosCatcher self-care journal: mood, medication, sleep and water";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// Log level used when `--verbose` is passed.
pub const VERBOSE_LOG_LEVEL: &str = "debug";
/// Default number of entries shown by `list` commands.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Default lookback for medication stats, in days.
pub const DEFAULT_MED_STATS_DAYS: u32 = 14;
/// Default trend sensitivity in mood points per day.
pub const DEFAULT_TREND_EPSILON: f64 = 0.05;
/// Exit status when the git guard refuses a data path. clap uses 2 for usage errors.
pub const EXIT_CODE_REPO_GUARD: u8 = 3;

// Configuration Keys & Environment Variables
/// Environment variable overriding the data file location.
pub const ENV_VAR_DATA: &str = "CHAOSCATCHER_DATA";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default config directory, relative to the user's home directory.
pub const DEFAULT_CONFIG_SUBDIR: &str = ".config/chaoscatcher";
/// File name of the default data file inside the config directory.
pub const DEFAULT_DATA_FILE: &str = "data.json";
/// Extension appended to profile names.
pub const PROFILE_FILE_EXTENSION: &str = "json";

// Schema
/// Schema version written into new documents and required on load.
pub const SCHEMA_VERSION: u32 = 1;
/// Lowest accepted mood score.
pub const MOOD_SCORE_MIN: i64 = 1;
/// Highest accepted mood score.
pub const MOOD_SCORE_MAX: i64 = 10;

// File System Parameters
/// Name of the directory marking a git working tree.
pub const GIT_DIR_NAME: &str = ".git";
/// Upper bound on ancestors visited by the repository guard.
pub const MAX_ANCESTOR_DEPTH: usize = 200;
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for the data file (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;
/// Suffix of the temp file used during atomic saves.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Clock format used in CSV exports.
pub const CSV_TIME_FORMAT: &str = "%H:%M";
/// Display format for clock times (e.g. "7:34 AM").
pub const DISPLAY_TIME_FORMAT: &str = "%-I:%M %p";
/// Longest accepted duration, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;
/// Minutes per hour.
pub const MINUTES_PER_HOUR: u32 = 60;

// Stats
/// Days of daily mood averages shown in the summary.
pub const SUMMARY_MOOD_DAYS: usize = 7;
/// Number of tags reported by mood stats.
pub const TOP_TAGS_LIMIT: usize = 10;
/// Number of tags reported per day in the daily CSV export.
pub const DAILY_TOP_TAGS_LIMIT: usize = 5;
/// Block characters for mood sparklines, lowest to highest.
pub const SPARKLINE_BLOCKS: &str = "▁▂▃▄▅▆▇█";
/// Number of dose hours reported by medication stats.
pub const TOP_HOURS_LIMIT: usize = 5;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "chaoscatcher";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
