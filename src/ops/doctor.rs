//! Health check for the data file.

use crate::errors::{AppError, AppResult};
use crate::safety::find_git_root;
use crate::store::DataStore;
use std::path::PathBuf;
use tracing::debug;

/// Entry counts of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryCounts {
    pub moods: usize,
    pub medications: usize,
    pub water: usize,
}

/// Findings of `run_doctor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub data_path: PathBuf,
    /// Repository containing the data file, reported only when the guard is overridden.
    pub repo_root: Option<PathBuf>,
    /// `None` when the file does not exist yet.
    pub counts: Option<EntryCounts>,
    /// Unix permission bits of the data file.
    pub file_mode: Option<u32>,
}

impl DoctorReport {
    /// Whether the file is readable by users other than the owner.
    pub fn permissions_too_open(&self) -> bool {
        self.file_mode.map_or(false, |mode| mode & 0o077 != 0)
    }
}

/// Checks the guard, loads the document if present, and inspects permissions.
///
/// A missing file is reported, not treated as an error.
///
/// # Errors
///
/// Returns an error if the guard fails or an existing file does not load.
pub fn run_doctor(store: &DataStore) -> AppResult<DoctorReport> {
    store.guard()?;

    let counts = match store.load() {
        Ok(doc) => Some(EntryCounts {
            moods: doc.moods().len(),
            medications: doc.medications().len(),
            water: doc.water().len(),
        }),
        Err(AppError::NotFound { .. }) => None,
        Err(e) => return Err(e),
    };

    #[cfg(unix)]
    let file_mode = store.file_mode()?;
    #[cfg(not(unix))]
    let file_mode = None;

    let report = DoctorReport {
        data_path: store.path().to_path_buf(),
        repo_root: find_git_root(store.path()),
        counts,
        file_mode,
    };
    debug!(?report, "Doctor finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path().join("data.json"));

        let report = run_doctor(&store).unwrap();
        assert!(report.counts.is_none());
        assert!(report.file_mode.is_none());
        assert!(!report.permissions_too_open());
    }

    #[test]
    fn test_initialized_file_is_healthy() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path().join("data.json"));
        store.init().unwrap();

        let report = run_doctor(&store).unwrap();
        assert_eq!(
            report.counts,
            Some(EntryCounts {
                moods: 0,
                medications: 0,
                water: 0
            })
        );
        assert!(!report.permissions_too_open());
    }

    #[test]
    fn test_corrupt_file_fails() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path().join("data.json"));
        fs::write(store.path(), "[]").unwrap();

        assert!(matches!(run_doctor(&store), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_repo_root_reported_when_overridden() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let store = DataStore::new(dir.path().join("data.json")).allow_repo_data_path(true);

        let report = run_doctor(&store).unwrap();
        assert_eq!(
            report.repo_root,
            Some(fs::canonicalize(dir.path()).unwrap())
        );

        let guarded = DataStore::new(dir.path().join("data.json"));
        assert!(matches!(run_doctor(&guarded), Err(AppError::Safety { .. })));
    }
}
