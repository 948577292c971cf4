//! Command-line interface for chaoscatcher.
//!
//! This module defines the argument structure using `clap` derive. Parsing
//! stops at strings and simple types: time expressions, durations and tags
//! are interpreted later by the library so their errors carry full context.

use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_LIST_LIMIT, DEFAULT_MED_STATS_DAYS, DEFAULT_TREND_EPSILON,
    LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
};
use crate::ops::Window;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;

/// Command-line arguments for chaoscatcher.
#[derive(Parser)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, version)]
pub struct CliArgs {
    /// Path to the data file (overrides profile, CHAOSCATCHER_DATA and the default)
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<String>,

    /// Named profile stored as ~/.config/chaoscatcher/<NAME>.json
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Allow a data file inside a git repository
    #[arg(long, global = true)]
    pub allow_repo_data_path: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_name = "FORMAT",
        default_value = LOG_FORMAT_TEXT,
        value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON]
    )]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

impl fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliArgs")
            .field("data", &self.data.as_ref().map(|_| "[REDACTED_PATH]"))
            .field("profile", &self.profile)
            .field("allow_repo_data_path", &self.allow_repo_data_path)
            .field("verbose", &self.verbose)
            .field("log_format", &self.log_format)
            .field("command", &self.command)
            .finish()
    }
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data file if it does not exist
    Init,
    /// Show which data file is in use and why
    Where,
    /// Check the data file for problems
    Doctor,
    /// Show today's overview and recent mood
    Summary,
    /// Log and review mood
    Mood {
        #[command(subcommand)]
        command: MoodCommand,
    },
    /// Log and review medication
    Med {
        #[command(subcommand)]
        command: MedCommand,
    },
    /// Log and review water intake
    Water {
        #[command(subcommand)]
        command: WaterCommand,
    },
}

/// `mood` subcommands.
#[derive(Subcommand, Debug)]
pub enum MoodCommand {
    /// Log a mood score
    Add(MoodAddArgs),
    /// List recent mood entries
    List(ListArgs),
    /// Show today's mood entries
    Today(TodayArgs),
    /// Mood statistics over a window
    Stats(MoodStatsArgs),
    /// Export mood entries to CSV
    Export(ExportArgs),
    /// Export one row per day to CSV
    ExportDaily(ExportArgs),
}

/// `med` subcommands.
#[derive(Subcommand, Debug)]
pub enum MedCommand {
    /// Log a medication dose
    Add(MedAddArgs),
    /// List recent doses
    List(ListArgs),
    /// Show today's doses
    Today(TodayArgs),
    /// Dose statistics per medication
    Stats(MedStatsArgs),
    /// Export doses to CSV
    Export(ExportArgs),
}

/// `water` subcommands.
#[derive(Subcommand, Debug)]
pub enum WaterCommand {
    /// Log water intake
    Add(WaterAddArgs),
    /// List recent water entries
    List(ListArgs),
    /// Show today's water entries
    Today(TodayArgs),
    /// Export water entries to CSV
    Export(ExportArgs),
}

/// How a single entry is printed.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per entry
    #[default]
    Line,
    /// Multi-line block per entry
    Block,
}

#[derive(Args, Debug)]
pub struct MoodAddArgs {
    /// Mood score from 1 to 10
    #[arg(long, allow_negative_numbers = true)]
    pub score: i64,

    /// When it happened, e.g. "7:34am", "yesterday 9pm", "2 hours ago" (default: now)
    #[arg(long)]
    pub time: Option<String>,

    /// Tags separated by commas or spaces
    #[arg(long)]
    pub tags: Option<String>,

    /// Total sleep as H:MM, minutes or 7h30m
    #[arg(long)]
    pub sleep: Option<String>,

    /// REM sleep as H:MM, minutes or 1h30m
    #[arg(long)]
    pub rem: Option<String>,

    /// Deep sleep as H:MM, minutes or 1h30m
    #[arg(long)]
    pub deep: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Line)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct MedAddArgs {
    /// Medication name
    #[arg(long)]
    pub name: String,

    /// Dose, e.g. "30 mg"
    #[arg(long)]
    pub dose: String,

    /// When it was taken (default: now)
    #[arg(long)]
    pub time: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Line)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct WaterAddArgs {
    /// Amount in ounces
    #[arg(long)]
    pub oz: u32,

    /// When it was drunk (default: now)
    #[arg(long)]
    pub time: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Line)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum number of entries shown, newest first
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: usize,

    /// Earliest date included (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Latest date included (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Line)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct TodayArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Line)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct MoodStatsArgs {
    /// Trailing days including today, or "all"
    #[arg(long, default_value = "7")]
    pub window: Window,

    /// Slope (points per day) below which the trend counts as stable
    #[arg(long, default_value_t = DEFAULT_TREND_EPSILON)]
    pub trend_epsilon: f64,
}

#[derive(Args, Debug)]
pub struct MedStatsArgs {
    /// Trailing days including today
    #[arg(long, default_value_t = DEFAULT_MED_STATS_DAYS)]
    pub days: u32,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output CSV path
    #[arg(long, value_name = "PATH")]
    pub csv: String,

    /// Trailing days including today, or "all"
    #[arg(long, default_value = "30")]
    pub window: Window,
}

/// Parses a `YYYY-MM-DD` date argument.
fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "chaoscatcher",
            "mood",
            "today",
            "--profile",
            "dev",
            "-v",
            "--log-format",
            "json",
        ]);
        assert_eq!(args.profile.as_deref(), Some("dev"));
        assert!(args.verbose);
        assert_eq!(args.log_format, "json");
        assert!(matches!(
            args.command,
            Command::Mood {
                command: MoodCommand::Today(_)
            }
        ));
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["chaoscatcher", "init"]);
        assert!(args.data.is_none());
        assert!(args.profile.is_none());
        assert!(!args.allow_repo_data_path);
        assert!(!args.verbose);
        assert_eq!(args.log_format, LOG_FORMAT_TEXT);
        assert!(matches!(args.command, Command::Init));
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let result = CliArgs::try_parse_from(["chaoscatcher", "--log-format", "xml", "init"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mood_add_arguments() {
        let args = CliArgs::parse_from([
            "chaoscatcher",
            "mood",
            "add",
            "--score",
            "7",
            "--tags",
            "baseline,school",
            "--sleep",
            "7:30",
            "--time",
            "yesterday 9pm",
            "--format",
            "block",
        ]);
        match args.command {
            Command::Mood {
                command: MoodCommand::Add(add),
            } => {
                assert_eq!(add.score, 7);
                assert_eq!(add.tags.as_deref(), Some("baseline,school"));
                assert_eq!(add.sleep.as_deref(), Some("7:30"));
                assert_eq!(add.time.as_deref(), Some("yesterday 9pm"));
                assert_eq!(add.format, OutputFormat::Block);
            }
            other => panic!("Expected mood add, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_score_reaches_validation() {
        let args = CliArgs::parse_from(["chaoscatcher", "mood", "add", "--score", "-2"]);
        match args.command {
            Command::Mood {
                command: MoodCommand::Add(add),
            } => assert_eq!(add.score, -2),
            other => panic!("Expected mood add, got {:?}", other),
        }
    }

    #[test]
    fn test_list_arguments() {
        let args = CliArgs::parse_from([
            "chaoscatcher",
            "med",
            "list",
            "--limit",
            "5",
            "--from",
            "2026-02-01",
        ]);
        match args.command {
            Command::Med {
                command: MedCommand::List(list),
            } => {
                assert_eq!(list.limit, 5);
                assert_eq!(list.from, NaiveDate::from_ymd_opt(2026, 2, 1));
                assert!(list.to.is_none());
                assert_eq!(list.format, OutputFormat::Line);
            }
            other => panic!("Expected med list, got {:?}", other),
        }

        let result =
            CliArgs::try_parse_from(["chaoscatcher", "water", "list", "--to", "02/01/2026"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_windows() {
        let args = CliArgs::parse_from(["chaoscatcher", "mood", "stats"]);
        match args.command {
            Command::Mood {
                command: MoodCommand::Stats(stats),
            } => {
                assert_eq!(stats.window, Window::Days(7));
                assert_eq!(stats.trend_epsilon, DEFAULT_TREND_EPSILON);
            }
            other => panic!("Expected mood stats, got {:?}", other),
        }

        let args = CliArgs::parse_from([
            "chaoscatcher",
            "mood",
            "export-daily",
            "--csv",
            "d.csv",
            "--window",
            "all",
        ]);
        match args.command {
            Command::Mood {
                command: MoodCommand::ExportDaily(export),
            } => {
                assert_eq!(export.window, Window::AllTime);
                assert_eq!(export.csv, "d.csv");
            }
            other => panic!("Expected mood export-daily, got {:?}", other),
        }

        let result = CliArgs::try_parse_from(["chaoscatcher", "mood", "stats", "--window", "0"]);
        assert!(result.is_err());

        let args = CliArgs::parse_from(["chaoscatcher", "med", "stats"]);
        match args.command {
            Command::Med {
                command: MedCommand::Stats(stats),
            } => assert_eq!(stats.days, DEFAULT_MED_STATS_DAYS),
            other => panic!("Expected med stats, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_data_path() {
        let args =
            CliArgs::parse_from(["chaoscatcher", "--data", "/home/me/secret.json", "where"]);
        let debug_output = format!("{:?}", args);
        assert!(debug_output.contains("[REDACTED_PATH]"));
        assert!(!debug_output.contains("secret.json"));
    }
}
