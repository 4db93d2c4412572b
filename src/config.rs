//! Layered configuration.
//!
//! Values are merged with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config <PATH>`, or `config.toml` in the platform config
//!    directory (e.g. `~/.config/find-duplicates/config.toml`) if it exists
//! 3. Environment variables prefixed `FIND_DUPLICATES_`
//!    (e.g. `FIND_DUPLICATES_IO_THREADS=8`)
//! 4. Command-line flags, applied by the caller
//!
//! ```toml
//! recursive = true
//! warn_threshold = 500
//! io_threads = 8
//! signature = "prefix"
//! paranoid = false
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "target/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{SignatureMode, DEFAULT_IO_THREADS, DEFAULT_WARN_THRESHOLD};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "FIND_DUPLICATES_";

/// Settings that can come from a file or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Include subdirectories.
    pub recursive: bool,
    /// Duplicate-size class count that triggers the confirmation prompt.
    pub warn_threshold: usize,
    /// Never ask for confirmation.
    pub no_warn: bool,
    /// Worker pool size for signatures and digests.
    pub io_threads: usize,
    /// Fast signature mode.
    pub signature: SignatureMode,
    /// Byte-for-byte verification instead of digests.
    pub paranoid: bool,
    /// Skip dot files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recursive: false,
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            no_warn: false,
            io_threads: DEFAULT_IO_THREADS,
            signature: SignatureMode::default(),
            paranoid: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has a value of the wrong type.
    #[error("Invalid configuration{}: {source}", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Invalid {
        /// File being read, if the error came from a file
        path: Option<PathBuf>,
        /// Underlying figment error
        #[source]
        source: Box<figment::Error>,
    },
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// `explicit` must exist when given. Without it, the default file is used
    /// only if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit file is missing or any layer
    /// is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(path) = &file {
            log::debug!("Loading config from {}", path.display());
        }

        Self::figment(file.as_deref())
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::Invalid {
                path: file,
                source: Box::new(e),
            })
    }

    /// Defaults merged with `file`, without the environment layer.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        }
    }

    /// Platform-specific location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "find-duplicates").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
