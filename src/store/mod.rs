//! Persistence for the journal document.
//!
//! `DataStore` owns the resolved data file path and performs every read and
//! write. Each operation runs the repository guard first. Saves are atomic:
//! the document is written to a temp file in the same directory, synced, and
//! renamed over the target, so readers see either the old or the new
//! document and never a partial one.

use crate::errors::{AppError, AppResult};
use crate::records::DataDocument;
use crate::safety::check_not_in_git;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

#[cfg(unix)]
use crate::constants::{DEFAULT_DIR_PERMISSIONS, DEFAULT_FILE_PERMISSIONS};
use crate::constants::TEMP_FILE_SUFFIX;
#[cfg(unix)]
use std::fs::Permissions;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[cfg(test)]
mod tests;

/// Result of `DataStore::init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new empty document was written.
    Created,
    /// A document already existed and loaded cleanly.
    AlreadyValid,
}

/// Handle to the data file on disk.
#[derive(Debug, Clone)]
pub struct DataStore {
    path: PathBuf,
    allow_repo_data_path: bool,
}

impl DataStore {
    /// Creates a store for the given data file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DataStore {
            path: path.into(),
            allow_repo_data_path: false,
        }
    }

    /// Sets whether the repository guard may be bypassed.
    pub fn allow_repo_data_path(mut self, allow: bool) -> Self {
        self.allow_repo_data_path = allow;
        self
    }

    /// The data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the repository guard, honouring the override.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Safety` if the data file sits inside a git working
    /// tree and the override is off.
    pub fn guard(&self) -> AppResult<()> {
        match check_not_in_git(&self.path) {
            Err(AppError::Safety { repo_root, .. }) if self.allow_repo_data_path => {
                warn!(
                    path = %self.path.display(),
                    repo_root = %repo_root.display(),
                    "Using data file inside a git repository (--allow-repo-data-path)"
                );
                Ok(())
            }
            other => other,
        }
    }

    /// Creates an empty document if none exists, otherwise verifies the existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the repository guard fails
    /// - the existing file does not load cleanly (`AppError::Validation`)
    /// - directories or the file cannot be written
    pub fn init(&self) -> AppResult<InitOutcome> {
        self.guard()?;

        if self.path.exists() {
            self.read_document()?;
            debug!(path = %self.path.display(), "Existing data file is valid");
            return Ok(InitOutcome::AlreadyValid);
        }

        self.stage_document(&DataDocument::new())?.commit()?;
        info!(path = %self.path.display(), "Initialized data file");
        Ok(InitOutcome::Created)
    }

    /// Loads and validates the document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the repository guard fails
    /// - the file does not exist (`AppError::NotFound`)
    /// - the content is malformed or breaks a schema invariant (`AppError::Validation`)
    pub fn load(&self) -> AppResult<DataDocument> {
        self.guard()?;
        self.read_document()
    }

    /// Atomically replaces the data file with `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the guard fails or any filesystem step fails. On
    /// error the previous file content is left untouched.
    pub fn save(&self, document: &DataDocument) -> AppResult<()> {
        self.stage(document)?.commit()
    }

    /// Writes `document` to a synced temp file next to the target without
    /// replacing the target yet.
    ///
    /// Dropping the returned `PendingSave` without committing removes the temp
    /// file and leaves the target unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the guard fails or the temp file cannot be written.
    pub fn stage(&self, document: &DataDocument) -> AppResult<PendingSave> {
        self.guard()?;
        self.stage_document(document)
    }

    /// Loads the document, applies `mutate`, and saves the result.
    ///
    /// Nothing is written when `mutate` fails.
    ///
    /// # Errors
    ///
    /// Returns the first error from loading, `mutate`, or saving.
    pub fn update<T, F>(&self, mutate: F) -> AppResult<T>
    where
        F: FnOnce(&mut DataDocument) -> AppResult<T>,
    {
        self.guard()?;
        let mut document = self.read_document()?;
        let output = mutate(&mut document)?;
        self.stage_document(&document)?.commit()?;
        Ok(output)
    }

    /// Unix permission bits of the data file, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if metadata cannot be read for a reason other
    /// than the file being missing.
    #[cfg(unix)]
    pub fn file_mode(&self) -> AppResult<Option<u32>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.permissions().mode() & 0o777)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_document(&self) -> AppResult<DataDocument> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AppError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} is empty",
                self.path.display()
            )));
        }

        let document: DataDocument = serde_json::from_str(&raw).map_err(|e| {
            AppError::Validation(format!(
                "{} is not a valid ChaosCatcher data file: {}",
                self.path.display(),
                e
            ))
        })?;

        document.validate().map_err(|e| match e {
            AppError::Validation(msg) => {
                AppError::Validation(format!("{}: {}", self.path.display(), msg))
            }
            other => other,
        })?;

        debug!(
            path = %self.path.display(),
            moods = document.moods().len(),
            medications = document.medications().len(),
            water = document.water().len(),
            "Loaded data file"
        );
        Ok(document)
    }

    fn stage_document(&self, document: &DataDocument) -> AppResult<PendingSave> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Data file path has no parent directory: {}",
                    self.path.display()
                ))
            })?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Data file path must name a file: {}",
                    self.path.display()
                ))
            })?
            .to_string_lossy()
            .into_owned();

        ensure_data_directory_exists(parent)?;

        let mut payload = serde_json::to_string_pretty(document).map_err(io::Error::other)?;
        payload.push('\n');

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(TEMP_FILE_SUFFIX)
            .tempfile_in(parent)?;
        temp.write_all(payload.as_bytes())?;
        temp.flush()?;
        temp.as_file().sync_all()?;

        #[cfg(unix)]
        temp.as_file()
            .set_permissions(Permissions::from_mode(DEFAULT_FILE_PERMISSIONS))?;

        debug!(temp = %temp.path().display(), bytes = payload.len(), "Staged data file");
        Ok(PendingSave {
            temp,
            target: self.path.clone(),
        })
    }
}

/// A fully written temp file waiting to replace the data file.
///
/// The temp file is deleted when this value is dropped without `commit`.
#[derive(Debug)]
pub struct PendingSave {
    temp: NamedTempFile,
    target: PathBuf,
}

impl PendingSave {
    /// Location of the staged temp file.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Renames the temp file over the target.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the rename fails; the temp file is removed.
    pub fn commit(self) -> AppResult<()> {
        let target = self.target;
        self.temp.persist(&target).map_err(|e| e.error)?;
        debug!(path = %target.display(), "Committed data file");
        Ok(())
    }
}

/// Creates the data directory (and parents) if missing.
///
/// Newly created directories get owner-only permissions on unix; existing
/// directories are left as they are.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory cannot be created or its
/// permissions cannot be set.
pub fn ensure_data_directory_exists(dir: &Path) -> AppResult<()> {
    if dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create data directory {}: {}", dir.display(), e),
        ))
    })?;

    #[cfg(unix)]
    {
        fs::set_permissions(dir, Permissions::from_mode(DEFAULT_DIR_PERMISSIONS)).map_err(
            |e| {
                AppError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to set permissions on data directory: {}", e),
                ))
            },
        )?;
    }

    debug!(dir = %dir.display(), "Created data directory");
    Ok(())
}
