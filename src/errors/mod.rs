//! Error handling utilities for the chaoscatcher application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents failures to interpret a user-supplied time, clock or duration expression.
///
/// Every variant carries the offending input so the command surface can print
/// an actionable message.
///
/// # Examples
///
/// ```
/// use chaoscatcher::errors::ParseError;
///
/// let error = ParseError::Duration {
///     input: "25:00".to_string(),
///     reason: "longer than 24 hours".to_string(),
/// };
///
/// assert!(format!("{}", error).contains("25:00"));
/// assert!(format!("{}", error).contains("H:MM"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input matched none of the accepted timestamp forms.
    #[error("Could not parse time '{input}'. Try ISO like '2026-02-25T07:34:00-05:00', '2026-02-25 7:34am', '7:34am', 'yesterday 9am' or '3 days ago'.")]
    Timestamp {
        /// The rejected input
        input: String,
    },

    /// The clock part of an expression was not a valid time of day.
    #[error("Could not parse clock time '{input}'. Use forms like '9am', '7:34 pm' or '14:00'.")]
    Clock {
        /// The rejected clock expression
        input: String,
    },

    /// The input was not an acceptable duration.
    #[error("Invalid duration '{input}': {reason}. Use minutes, H:MM like 7:30, or 7h30m.")]
    Duration {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Represents all possible errors that can occur in the chaoscatcher application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use chaoscatcher::errors::AppError;
///
/// let error = AppError::Config("--data and --profile disagree".to_string());
/// assert_eq!(
///     format!("{}", error),
///     "Configuration error: --data and --profile disagree"
/// );
/// ```
///
/// Converting from an IO error:
/// ```
/// use chaoscatcher::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::PermissionDenied, "denied");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::PermissionDenied),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Conflicting or invalid path resolution inputs.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data file lives inside a version-control working tree.
    #[error("Refusing to use a data file inside a git repository: {path} (repository root: {repo_root}). Use ~/.config/chaoscatcher/*.json or pass --allow-repo-data-path.")]
    Safety {
        /// The resolved data file path
        path: PathBuf,
        /// The directory containing the `.git` entry
        repo_root: PathBuf,
    },

    /// An expected data file does not exist.
    #[error("Data file not found: {path}. Run `chaoscatcher init` first.")]
    NotFound {
        /// The path that was looked up
        path: PathBuf,
    },

    /// File content or an entry failed schema checks.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A time, clock or duration expression could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors while writing a CSV export.
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use chaoscatcher::errors::{AppResult, AppError};
///
/// fn might_fail(score: i64) -> AppResult<i64> {
///     if score > 10 {
///         return Err(AppError::Validation("score out of range".to_string()));
///     }
///     Ok(score)
/// }
///
/// assert!(might_fail(11).is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;
