//! Repository guard for the data file.
//!
//! Personal health data must never end up committed to a git repository by
//! accident. These checks resolve the data path to where it physically
//! lives, then walk its ancestors looking for a `.git` entry. They only
//! inspect metadata and never create, read or modify files.

use crate::constants::{GIT_DIR_NAME, MAX_ANCESTOR_DEPTH};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Returns the root of the git working tree containing `data_path`, if any.
///
/// Relative paths are anchored at the current directory and symlinks are
/// followed before the walk, so a config directory linked into a dotfiles
/// repository is still caught. The walk starts at the file's parent
/// directory, so the data file itself does not need to exist. A `.git` file
/// (as used by worktrees and submodules) counts as well as a `.git`
/// directory.
///
/// # Examples
///
/// ```
/// use chaoscatcher::safety::find_git_root;
/// use std::fs;
///
/// let dir = tempfile::tempdir().unwrap();
/// fs::create_dir(dir.path().join(".git")).unwrap();
/// let data = dir.path().join("nested/data.json");
///
/// assert_eq!(find_git_root(&data), Some(fs::canonicalize(dir.path()).unwrap()));
/// ```
pub fn find_git_root(data_path: &Path) -> Option<PathBuf> {
    let resolved = match physical_path(data_path) {
        Ok(path) => path,
        Err(e) => {
            debug!(path = %data_path.display(), error = %e, "Could not resolve data path");
            data_path.to_path_buf()
        }
    };
    let mut current = resolved.parent();

    for _ in 0..MAX_ANCESTOR_DEPTH {
        let dir = current?;
        if dir.as_os_str().is_empty() {
            return None;
        }
        if dir.join(GIT_DIR_NAME).exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }

    None
}

/// Resolves `path` to an absolute path with symlinks and `..` resolved.
///
/// The file and some of its directories may not exist yet, so the deepest
/// existing ancestor is canonicalized and the missing tail re-appended.
fn physical_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    for ancestor in absolute.ancestors() {
        let mut resolved = match fs::canonicalize(ancestor) {
            Ok(resolved) => resolved,
            Err(_) => continue,
        };
        let tail = absolute
            .strip_prefix(ancestor)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        for component in tail.components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                _ => {}
            }
        }
        return Ok(resolved);
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no existing ancestor of {}", path.display()),
    ))
}

/// Reports whether `data_path` sits inside a git working tree.
pub fn is_inside_git_repo(data_path: &Path) -> bool {
    find_git_root(data_path).is_some()
}

/// Fails if `data_path` sits inside a git working tree.
///
/// # Errors
///
/// Returns `AppError::Safety` naming the data path and the repository root.
pub fn check_not_in_git(data_path: &Path) -> AppResult<()> {
    match find_git_root(data_path) {
        Some(repo_root) => Err(AppError::Safety {
            path: data_path.to_path_buf(),
            repo_root,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_outside_repository_passes() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data.json");

        // tempdir normally lives outside any repository; skip otherwise.
        if find_git_root(dir.path()).is_some() {
            return;
        }

        assert!(!is_inside_git_repo(&data));
        assert!(check_not_in_git(&data).is_ok());
    }

    #[test]
    fn test_git_directory_in_ancestor_is_detected() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let data = dir.path().join("a").join("b").join("data.json");

        assert!(is_inside_git_repo(&data));
        match check_not_in_git(&data) {
            Err(AppError::Safety { path, repo_root }) => {
                assert_eq!(path, data);
                assert_eq!(repo_root, fs::canonicalize(dir.path()).unwrap());
            }
            other => panic!("Expected Safety error, got {:?}", other),
        }
    }

    #[test]
    fn test_git_file_counts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".git"), "gitdir: /elsewhere\n").unwrap();
        let data = dir.path().join("data.json");

        assert_eq!(
            find_git_root(&data),
            Some(fs::canonicalize(dir.path()).unwrap())
        );
    }

    #[test]
    fn test_check_has_no_side_effects() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let data = dir.path().join("missing").join("data.json");

        let _ = check_not_in_git(&data);

        assert!(!dir.path().join("missing").exists());
        assert!(!data.exists());
    }

    #[test]
    fn test_nearest_repository_wins() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("vendor").join("inner");
        fs::create_dir_all(inner.join(".git")).unwrap();

        assert_eq!(
            find_git_root(&inner.join("data.json")),
            Some(fs::canonicalize(&inner).unwrap())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_config_dir_into_repository_is_detected() {
        let dir = tempdir().unwrap();
        let dotfiles = dir.path().join("dotfiles");
        fs::create_dir_all(dotfiles.join(".git")).unwrap();
        fs::create_dir_all(dotfiles.join("chaoscatcher")).unwrap();
        let config = dir.path().join("home").join(".config");
        fs::create_dir_all(&config).unwrap();
        std::os::unix::fs::symlink(dotfiles.join("chaoscatcher"), config.join("chaoscatcher"))
            .unwrap();

        let data = config.join("chaoscatcher").join("data.json");
        assert_eq!(
            find_git_root(&data),
            Some(fs::canonicalize(&dotfiles).unwrap())
        );
        assert!(matches!(
            check_not_in_git(&data),
            Err(AppError::Safety { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_data_file_into_repository_is_detected() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::write(repo.join("data.json"), "{}").unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(repo.join("data.json"), outside.join("data.json")).unwrap();

        assert_eq!(
            find_git_root(&outside.join("data.json")),
            Some(fs::canonicalize(&repo).unwrap())
        );
    }

    #[test]
    fn test_parent_components_resolve_out_of_repository() {
        let dir = tempdir().unwrap();
        if find_git_root(dir.path()).is_some() {
            return;
        }
        let repo = dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir(dir.path().join("plain")).unwrap();

        let escaped = repo.join("..").join("plain").join("data.json");
        assert_eq!(find_git_root(&escaped), None);

        let missing = repo.join("..").join("missing").join("data.json");
        assert_eq!(find_git_root(&missing), None);

        let back_in = dir.path().join("plain").join("..").join("repo").join("data.json");
        assert_eq!(
            find_git_root(&back_in),
            Some(fs::canonicalize(&repo).unwrap())
        );
    }

    #[test]
    #[serial]
    fn test_relative_path_resolves_against_current_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let previous = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();

        let found = find_git_root(Path::new("sub/data.json"));
        let bare = find_git_root(Path::new("data.json"));
        env::set_current_dir(previous).unwrap();

        let root = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(found, Some(root.clone()));
        assert_eq!(bare, Some(root));
    }
}
