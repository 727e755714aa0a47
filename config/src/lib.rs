//! Launcher configuration.
//!
//! The configuration file lives next to the executable (the launcher makes
//! that directory its working directory before loading). Every field has a
//! default, so a missing file is not an error.
//!
//! ```toml
//! [launcher]
//! entry_class = "com/guardium/gui/AppMain"
//! classpath = ["va.Jar"]
//! options = ["-Djava.library.path=."]
//! poll_interval_ms = 1000
//! splash_grace_ms = 2000
//! splash_image = "Splash-load.bmp"
//! hide_console = true
//!
//! [runtime]
//! java_home = "${JAVA_HOME}"
//!
//! [logging]
//! file = "Va.log"
//!
//! [pid_file]
//! enabled = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use jhost_types::{DEFAULT_ENTRY_CLASS, EntryPointDescriptor};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "jhost.toml";

const DEFAULT_LOG_FILE: &str = "Va.log";
const DEFAULT_PID_FILE: &str = "jhost.pid";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_SPLASH_GRACE_MS: u64 = 2000;
const DEFAULT_SPLASH_IMAGE: &str = "Splash-load.bmp";

// Default value functions for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

fn default_entry_class() -> String {
    DEFAULT_ENTRY_CLASS.to_string()
}

fn default_classpath() -> Vec<String> {
    vec!["va.Jar".to_string()]
}

fn default_options() -> Vec<String> {
    vec!["-Djava.library.path=.".to_string()]
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

const fn default_splash_grace_ms() -> u64 {
    DEFAULT_SPLASH_GRACE_MS
}

fn default_splash_image() -> PathBuf {
    PathBuf::from(DEFAULT_SPLASH_IMAGE)
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_pid_file() -> PathBuf {
    PathBuf::from(DEFAULT_PID_FILE)
}

#[derive(Debug, Default, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub launcher: LaunchConfig,
    #[serde(default)]
    pub runtime: RuntimeOverrides,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pid_file: PidFileConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// What to run and how to supervise it.
#[derive(Debug, Deserialize)]
pub struct LaunchConfig {
    /// Entry class, slash- or dot-separated.
    #[serde(default = "default_entry_class")]
    pub entry_class: String,
    /// Classpath entries, joined in order.
    #[serde(default = "default_classpath")]
    pub classpath: Vec<String>,
    /// Auxiliary runtime options placed after the classpath option.
    #[serde(default = "default_options")]
    pub options: Vec<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay before closing the splash once the entry point returns.
    #[serde(default = "default_splash_grace_ms")]
    pub splash_grace_ms: u64,
    /// Bitmap shown while the runtime starts; skipped if it cannot be loaded.
    #[serde(default = "default_splash_image")]
    pub splash_image: PathBuf,
    #[serde(default = "default_true")]
    pub hide_console: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            entry_class: default_entry_class(),
            classpath: default_classpath(),
            options: default_options(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            splash_grace_ms: DEFAULT_SPLASH_GRACE_MS,
            splash_image: default_splash_image(),
            hide_console: true,
        }
    }
}

impl LaunchConfig {
    #[must_use]
    pub fn entry_point(&self) -> EntryPointDescriptor {
        EntryPointDescriptor::new(self.entry_class.as_str())
    }

    /// Clamped to at least one millisecond.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    #[must_use]
    pub fn splash_grace(&self) -> Duration {
        Duration::from_millis(self.splash_grace_ms)
    }
}

/// Bypasses for registry discovery.
///
/// Values may reference environment variables as `${NAME}`.
#[derive(Debug, Default, Deserialize)]
pub struct RuntimeOverrides {
    /// Use this runtime home instead of searching the registry.
    pub java_home: Option<String>,
    /// Load this library instead of resolving one from the home directory.
    pub runtime_lib: Option<String>,
}

impl RuntimeOverrides {
    #[must_use]
    pub fn java_home(&self) -> Option<PathBuf> {
        expand_path(self.java_home.as_deref())
    }

    #[must_use]
    pub fn runtime_lib(&self) -> Option<PathBuf> {
        expand_path(self.runtime_lib.as_deref())
    }
}

fn expand_path(raw: Option<&str>) -> Option<PathBuf> {
    let expanded = expand_env_vars(raw?);
    let trimmed = expanded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    /// Truncate the log before the first line of this run is written.
    #[serde(default)]
    pub erase_on_start: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            erase_on_start: false,
        }
    }
}

/// Process-identity file read by external tooling.
#[derive(Debug, Deserialize)]
pub struct PidFileConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_pid_file")]
    pub path: PathBuf,
}

impl Default for PidFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_pid_file(),
        }
    }
}

/// Replace `${NAME}` with the value of the environment variable `NAME`.
///
/// Unset variables expand to the empty string; an unterminated `${` is
/// copied through unchanged.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

impl LauncherConfig {
    #[must_use]
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Load from an explicit path. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load `jhost.toml` from `dir`, falling back to defaults.
    ///
    /// Runs before logging is initialized (the log location is part of the
    /// config), so a failure is handed back for the caller to report.
    #[must_use]
    pub fn load_or_default(dir: &Path) -> (Self, Option<ConfigError>) {
        match Self::load_from(&Self::path_in(dir)) {
            Ok(Some(config)) => (config, None),
            Ok(None) => (Self::default(), None),
            Err(err) => (Self::default(), Some(err)),
        }
    }
}
