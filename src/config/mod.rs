//! Configuration management for the chaoscatcher application.
//!
//! This module resolves which data file a command operates on. Resolution is a
//! pure function of explicit inputs (`PathInputs`), so tests can inject a
//! temporary config directory instead of relying on the real home directory.
//!
//! # Precedence (highest first)
//!
//! 1. Explicit `--data` path
//! 2. Named profile (`--profile dev` → `<config_dir>/dev.json`)
//! 3. `CHAOSCATCHER_DATA` environment variable
//! 4. Default `<config_dir>/data.json`, where `config_dir` is `~/.config/chaoscatcher`
//!
//! An explicit path and a profile may only be combined when they name the same file.

use crate::constants::{
    DEFAULT_CONFIG_SUBDIR, DEFAULT_DATA_FILE, ENV_VAR_DATA, ENV_VAR_HOME, PROFILE_FILE_EXTENSION,
};
use crate::errors::{AppError, AppResult};
use crate::store::DataStore;
use std::env;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Where the resolved data path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSource {
    /// An explicit `--data` path.
    Explicit,
    /// A named profile.
    Profile(String),
    /// The `CHAOSCATCHER_DATA` environment variable.
    Environment,
    /// The default location in the config directory.
    Default,
}

impl fmt::Display for PathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSource::Explicit => write!(f, "because you passed --data"),
            PathSource::Profile(name) => write!(f, "because you used --profile '{}'", name),
            PathSource::Environment => write!(f, "because {} is set", ENV_VAR_DATA),
            PathSource::Default => write!(f, "default config location"),
        }
    }
}

/// Raw inputs to data path resolution.
///
/// Everything that would otherwise be read from process-wide state lives here,
/// so resolution itself touches neither the environment nor the filesystem.
#[derive(Debug, Clone, Default)]
pub struct PathInputs {
    /// Value of the `--data` flag.
    pub explicit: Option<String>,
    /// Value of the `--profile` flag.
    pub profile: Option<String>,
    /// Value of the `CHAOSCATCHER_DATA` environment variable.
    pub env_value: Option<String>,
    /// Directory holding the default data file and profiles.
    pub config_dir: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    pub working_dir: PathBuf,
}

impl PathInputs {
    /// Collects inputs from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the current directory cannot be determined.
    pub fn from_env(explicit: Option<&str>, profile: Option<&str>) -> AppResult<Self> {
        let config_dir = env::var(ENV_VAR_HOME)
            .ok()
            .filter(|home| !home.trim().is_empty())
            .map(|home| default_config_dir(Path::new(&home)));

        Ok(PathInputs {
            explicit: explicit.map(str::to_string),
            profile: profile.map(str::to_string),
            env_value: env::var(ENV_VAR_DATA).ok(),
            config_dir,
            working_dir: env::current_dir()?,
        })
    }
}

/// Configuration for a single invocation.
///
/// # Examples
///
/// ```
/// use chaoscatcher::config::{Config, PathInputs, PathSource};
/// use std::path::PathBuf;
///
/// let inputs = PathInputs {
///     profile: Some("dev".to_string()),
///     config_dir: Some(PathBuf::from("/home/me/.config/chaoscatcher")),
///     working_dir: PathBuf::from("/"),
///     ..PathInputs::default()
/// };
///
/// let config = Config::from_inputs(&inputs, false).unwrap();
/// assert_eq!(config.data_path, PathBuf::from("/home/me/.config/chaoscatcher/dev.json"));
/// assert_eq!(config.source, PathSource::Profile("dev".to_string()));
/// ```
pub struct Config {
    /// Absolute path of the data file.
    pub data_path: PathBuf,

    /// Which input selected `data_path`.
    pub source: PathSource,

    /// Whether the git repository guard is bypassed.
    pub allow_repo_data_path: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_path", &"[REDACTED_PATH]")
            .field("source", &self.source)
            .field("allow_repo_data_path", &self.allow_repo_data_path)
            .finish()
    }
}

impl Config {
    /// Loads configuration from command-line values and the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the inputs conflict or cannot be resolved.
    pub fn load(
        explicit: Option<&str>,
        profile: Option<&str>,
        allow_repo_data_path: bool,
    ) -> AppResult<Self> {
        let inputs = PathInputs::from_env(explicit, profile)?;
        Self::from_inputs(&inputs, allow_repo_data_path)
    }

    /// Builds configuration from already-collected inputs.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the inputs conflict or cannot be resolved.
    pub fn from_inputs(inputs: &PathInputs, allow_repo_data_path: bool) -> AppResult<Self> {
        let (data_path, source) = resolve_data_path(inputs)?;
        Ok(Config {
            data_path,
            source,
            allow_repo_data_path,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the data path is empty, relative, or has no
    /// file name.
    pub fn validate(&self) -> AppResult<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(AppError::Config("Data file path is empty".to_string()));
        }

        if !self.data_path.is_absolute() {
            return Err(AppError::Config(
                "Data file path must be an absolute path".to_string(),
            ));
        }

        if self.data_path.file_name().is_none() {
            return Err(AppError::Config(format!(
                "Data file path must name a file: {}",
                self.data_path.display()
            )));
        }

        Ok(())
    }

    /// Opens a store handle for the configured data file.
    pub fn store(&self) -> DataStore {
        DataStore::new(self.data_path.clone()).allow_repo_data_path(self.allow_repo_data_path)
    }
}

/// Returns the default config directory under a home directory.
pub fn default_config_dir(home: &Path) -> PathBuf {
    home.join(DEFAULT_CONFIG_SUBDIR)
}

/// Resolves the data file path following the documented precedence.
///
/// # Errors
///
/// Returns `AppError::Config` if:
/// - the profile name is invalid
/// - `--data` and `--profile` are both given and name different files
/// - a path cannot be expanded
/// - a profile or the default location is needed but no config directory is known
pub fn resolve_data_path(inputs: &PathInputs) -> AppResult<(PathBuf, PathSource)> {
    let profile_path = match inputs.profile.as_deref() {
        Some(name) => {
            validate_profile_name(name)?;
            let dir = require_config_dir(inputs)?;
            Some((
                dir.join(format!("{}.{}", name, PROFILE_FILE_EXTENSION)),
                name,
            ))
        }
        None => None,
    };

    if let Some(raw) = inputs.explicit.as_deref() {
        let explicit = expand_path(raw, &inputs.working_dir)?;
        if let Some((profile_file, name)) = &profile_path {
            if *profile_file != explicit {
                return Err(AppError::Config(format!(
                    "--data {} conflicts with --profile '{}' ({}); pass only one",
                    explicit.display(),
                    name,
                    profile_file.display()
                )));
            }
        }
        return Ok((explicit, PathSource::Explicit));
    }

    if let Some((profile_file, name)) = profile_path {
        return Ok((profile_file, PathSource::Profile(name.to_string())));
    }

    if let Some(raw) = inputs
        .env_value
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok((
            expand_path(raw, &inputs.working_dir)?,
            PathSource::Environment,
        ));
    }

    let dir = require_config_dir(inputs)?;
    Ok((dir.join(DEFAULT_DATA_FILE), PathSource::Default))
}

fn require_config_dir(inputs: &PathInputs) -> AppResult<PathBuf> {
    inputs.config_dir.clone().ok_or_else(|| {
        AppError::Config(format!(
            "{} is not set; pass --data or set {}",
            ENV_VAR_HOME, ENV_VAR_DATA
        ))
    })
}

/// Checks that a profile name can safely become a file name.
fn validate_profile_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::Config("Profile name cannot be empty".to_string()));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(AppError::Config(format!(
            "Profile name '{}' contains '{}'; use letters, digits, '-' or '_'",
            name, ch
        )));
    }

    Ok(())
}

/// Expands `~` and environment references, then anchors relative paths.
fn expand_path(raw: &str, working_dir: &Path) -> AppResult<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Config("Data file path is empty".to_string()));
    }

    let expanded = shellexpand::full(trimmed)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    let path = PathBuf::from(expanded.into_owned());
    let absolute = if path.is_absolute() {
        path
    } else {
        working_dir.join(path)
    };

    Ok(absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}
