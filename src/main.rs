/*!
# ChaosCatcher - A Local Self-Care Journal

ChaosCatcher records mood, sleep, medication and water intake into a single
JSON file on your machine and answers quick questions about it: what did I
log today, how has my mood been this week, when do I usually take my meds.

This file contains the binary entry point: logging setup, configuration,
and dispatch from parsed arguments to library operations.

## Usage

```text
chaoscatcher [OPTIONS] <COMMAND>

Commands:
  init     Create the data file if it does not exist
  where    Show which data file is in use and why
  doctor   Check the data file for problems
  summary  Show today's overview and recent mood
  mood     Log and review mood
  med      Log and review medication
  water    Log and review water intake

Options:
      --data <PATH>             Path to the data file
      --profile <NAME>          Named profile stored as ~/.config/chaoscatcher/<NAME>.json
      --allow-repo-data-path    Allow a data file inside a git repository
  -v, --verbose                 Enable debug logging
      --log-format <FORMAT>     Log output format [default: text] [possible values: text, json]
```

## Configuration

- `CHAOSCATCHER_DATA`: data file used when neither `--data` nor `--profile` is given
- `RUST_LOG`: overrides the log filter
*/

use chaoscatcher::cli::{
    CliArgs, Command, ExportArgs, ListArgs, MedCommand, MoodCommand, OutputFormat, WaterCommand,
};
use chaoscatcher::config::Config;
use chaoscatcher::constants::{
    DEFAULT_LOG_LEVEL, EXIT_CODE_REPO_GUARD, LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME,
    TRACING_SERVICE_NAME, VERBOSE_LOG_LEVEL,
};
use chaoscatcher::display::{
    render_doctor, render_entries, render_medication_stats, render_mood_stats, render_summary,
    Render,
};
use chaoscatcher::errors::{AppError, AppResult};
use chaoscatcher::ops::{self, DateFilter};
use chaoscatcher::records::{parse_tags, MedicationEntry, MoodEntry, Timestamped, WaterEntry};
use chaoscatcher::store::{DataStore, InitOutcome};
use chaoscatcher::timeparse::{parse_duration, parse_timestamp};
use chrono::{DateTime, FixedOffset, Local, Timelike};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::EnvFilter;

/// The main entry point for the chaoscatcher application.
///
/// This function coordinates the overall application flow:
/// 1. Parses command-line arguments
/// 2. Initializes logging with the requested format and level
/// 3. Opens a root span carrying a correlation id
/// 4. Runs the command, reporting any error once
fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose, &args.log_format);

    let correlation_id = uuid::Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();
    debug!(?args, "Parsed arguments");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Sets up the global subscriber; `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, log_format: &str) {
    let default_level = if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (e.g. in tests); keep it.
    let _ = if log_format == LOG_FORMAT_JSON {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn exit_code(error: &AppError) -> ExitCode {
    match error {
        AppError::Safety { .. } => ExitCode::from(EXIT_CODE_REPO_GUARD),
        _ => ExitCode::FAILURE,
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    // Obtain current date/time once at the beginning
    let now = Local::now();

    let config = Config::load(
        args.data.as_deref(),
        args.profile.as_deref(),
        args.allow_repo_data_path,
    )?;
    config.validate()?;
    debug!(?config, "Resolved configuration");
    let store = config.store();

    match args.command {
        Command::Init => {
            match store.init()? {
                InitOutcome::Created => {
                    println!("✅ Created data file: {}", store.path().display())
                }
                InitOutcome::AlreadyValid => {
                    println!("✅ Data file already valid: {}", store.path().display())
                }
            }
            Ok(())
        }
        Command::Where => {
            println!("{}", config.data_path.display());
            println!("↳ {}", config.source);
            Ok(())
        }
        Command::Doctor => {
            let report = ops::run_doctor(&store)?;
            println!("{}", render_doctor(&report));
            Ok(())
        }
        Command::Summary => {
            let doc = store.load()?;
            println!("{}", render_summary(&ops::summary(&doc, now)));
            Ok(())
        }
        Command::Mood { command } => run_mood(&store, command, now),
        Command::Med { command } => run_med(&store, command, now),
        Command::Water { command } => run_water(&store, command, now),
    }
}

fn run_mood(store: &DataStore, command: MoodCommand, now: DateTime<Local>) -> AppResult<()> {
    match command {
        MoodCommand::Add(add) => {
            let timestamp = resolve_time(add.time.as_deref(), now)?;
            let sleep_total = add.sleep.as_deref().map(parse_duration).transpose()?;
            let sleep_rem = add.rem.as_deref().map(parse_duration).transpose()?;
            let sleep_deep = add.deep.as_deref().map(parse_duration).transpose()?;

            let entry = MoodEntry::new(timestamp, add.score)?
                .with_tags(add.tags.as_deref().map(parse_tags).unwrap_or_default())
                .with_sleep(sleep_total, sleep_rem, sleep_deep)
                .with_notes(add.notes);
            let stored = ops::add_mood(store, entry)?;
            println!("✅ Logged mood");
            println!("{}", stored.render(add.format));
            Ok(())
        }
        MoodCommand::List(list) => {
            let doc = store.load()?;
            print_list(doc.moods(), &list);
            Ok(())
        }
        MoodCommand::Today(today) => {
            let doc = store.load()?;
            print_entries(&ops::today(doc.moods(), now), today.format, "mood entries today");
            Ok(())
        }
        MoodCommand::Stats(stats) => {
            let doc = store.load()?;
            let result = ops::mood_stats(doc.moods(), stats.window, now, stats.trend_epsilon)?;
            println!("{}", render_mood_stats(&result));
            Ok(())
        }
        MoodCommand::Export(export) => {
            let doc = store.load()?;
            let path = export_path(&export);
            let rows = ops::export_moods_csv(doc.moods(), path, export.window, now)?;
            report_export(rows, path);
            Ok(())
        }
        MoodCommand::ExportDaily(export) => {
            let doc = store.load()?;
            let path = export_path(&export);
            let rows = ops::export_daily_moods_csv(doc.moods(), path, export.window, now)?;
            report_export(rows, path);
            Ok(())
        }
    }
}

fn run_med(store: &DataStore, command: MedCommand, now: DateTime<Local>) -> AppResult<()> {
    match command {
        MedCommand::Add(add) => {
            let timestamp = resolve_time(add.time.as_deref(), now)?;
            let entry =
                MedicationEntry::new(timestamp, &add.name, &add.dose)?.with_notes(add.notes);
            let stored = ops::add_medication(store, entry)?;
            println!("✅ Logged medication");
            println!("{}", stored.render(add.format));
            Ok(())
        }
        MedCommand::List(list) => {
            let doc = store.load()?;
            print_list(doc.medications(), &list);
            Ok(())
        }
        MedCommand::Today(today) => {
            let doc = store.load()?;
            print_entries(
                &ops::today(doc.medications(), now),
                today.format,
                "medication doses today",
            );
            Ok(())
        }
        MedCommand::Stats(stats) => {
            let doc = store.load()?;
            let result = ops::medication_stats(doc.medications(), stats.days, now)?;
            println!("{}", render_medication_stats(&result));
            Ok(())
        }
        MedCommand::Export(export) => {
            let doc = store.load()?;
            let path = export_path(&export);
            let rows = ops::export_medications_csv(doc.medications(), path, export.window, now)?;
            report_export(rows, path);
            Ok(())
        }
    }
}

fn run_water(store: &DataStore, command: WaterCommand, now: DateTime<Local>) -> AppResult<()> {
    match command {
        WaterCommand::Add(add) => {
            let timestamp = resolve_time(add.time.as_deref(), now)?;
            let stored = ops::add_water(store, WaterEntry::new(timestamp, add.oz)?)?;
            println!("✅ Logged water");
            println!("{}", stored.render(add.format));
            Ok(())
        }
        WaterCommand::List(list) => {
            let doc = store.load()?;
            print_list(doc.water(), &list);
            Ok(())
        }
        WaterCommand::Today(today) => {
            let doc = store.load()?;
            let todays = ops::today(doc.water(), now);
            print_entries(&todays, today.format, "water entries today");
            if !todays.is_empty() {
                println!("Total: {} oz", ops::total_ounces(&todays));
            }
            Ok(())
        }
        WaterCommand::Export(export) => {
            let doc = store.load()?;
            let path = export_path(&export);
            let rows = ops::export_water_csv(doc.water(), path, export.window, now)?;
            report_export(rows, path);
            Ok(())
        }
    }
}

/// Resolves `--time`, defaulting to the current moment.
fn resolve_time(raw: Option<&str>, now: DateTime<Local>) -> AppResult<DateTime<FixedOffset>> {
    match raw {
        Some(input) => Ok(parse_timestamp(input, now)?),
        None => Ok(now.with_nanosecond(0).unwrap_or(now).fixed_offset()),
    }
}

fn print_list<E: Timestamped + Render>(entries: &[E], args: &ListArgs) {
    let filter = DateFilter::between(args.from, args.to);
    let recent = ops::recent(entries, &filter, args.limit);
    print_entries(&recent, args.format, "entries");
}

fn print_entries<E: Render>(entries: &[&E], format: OutputFormat, what: &str) {
    if entries.is_empty() {
        println!("No {}.", what);
    } else {
        println!("{}", render_entries(entries, format));
    }
}

fn export_path(export: &ExportArgs) -> &Path {
    Path::new(&export.csv)
}

fn report_export(rows: usize, path: &Path) {
    info!(rows, "Export complete");
    println!("✅ Wrote {} row(s) to {}", rows, path.display());
}
