//! Shared configuration for the XenonCode playground.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! TOML file (`--config-path` or `XENON_CONFIG_PATH`), then `XENON_*`
//! environment variables, then command-line flags. The daemon loads the
//! configuration once at start-up; the compiler path in particular is
//! process-wide state with no teardown.

mod defaults;
mod listen;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_COMPILER, DEFAULT_ENTRY_FILE, DEFAULT_LINT_DEBOUNCE_MS, DEFAULT_LINT_TIMEOUT_SECS,
    DEFAULT_LINT_WORKERS, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER,
    DEFAULT_PROJECTS_ROOT, DEFAULT_RUN_HZ, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_SOURCE_EXTENSION,
    default_listen, default_log_filter, default_log_filter_string, default_log_format,
};
pub use listen::{ListenAddress, ListenParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved playground configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "XENON")]
pub struct Config {
    /// Address the HTTP surface binds to.
    #[ortho_config(default = defaults::default_listen())]
    #[serde(default = "defaults::default_listen")]
    pub listen: ListenAddress,
    /// Directory holding one sub-directory per project.
    #[ortho_config(default = defaults::default_projects_root())]
    #[serde(default = "defaults::default_projects_root")]
    pub projects_root: Utf8PathBuf,
    /// Compiler executable, either a bare name resolved on `PATH` or a path.
    #[ortho_config(default = defaults::default_compiler_path())]
    #[serde(default = "defaults::default_compiler_path")]
    pub compiler_path: Utf8PathBuf,
    /// Extension required on every source file name.
    #[ortho_config(default = defaults::default_source_extension())]
    #[serde(default = "defaults::default_source_extension")]
    pub source_extension: String,
    /// Entry file served with example content to first-time visitors.
    #[ortho_config(default = defaults::default_entry_file())]
    #[serde(default = "defaults::default_entry_file")]
    pub entry_file: String,
    /// Optional file replacing the built-in example program.
    #[serde(default)]
    pub bootstrap_file: Option<Utf8PathBuf>,
    /// Wall-clock budget for one run, in seconds.
    #[ortho_config(default = defaults::default_run_timeout_secs())]
    #[serde(default = "defaults::default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    /// Cycles per second handed to the runtime.
    #[ortho_config(default = defaults::default_run_hz())]
    #[serde(default = "defaults::default_run_hz")]
    pub run_hz: u32,
    /// Lint debounce quiet period, in milliseconds.
    #[ortho_config(default = defaults::default_lint_debounce_ms())]
    #[serde(default = "defaults::default_lint_debounce_ms")]
    pub lint_debounce_ms: u64,
    /// Maximum number of concurrent line checks.
    #[ortho_config(default = defaults::default_lint_workers())]
    #[serde(default = "defaults::default_lint_workers")]
    pub lint_workers: usize,
    /// Wall-clock budget for a single line check, in seconds.
    #[ortho_config(default = defaults::default_lint_timeout_secs())]
    #[serde(default = "defaults::default_lint_timeout_secs")]
    pub lint_timeout_secs: u64,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = defaults::default_log_format())]
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: defaults::default_listen(),
            projects_root: defaults::default_projects_root(),
            compiler_path: defaults::default_compiler_path(),
            source_extension: defaults::default_source_extension(),
            entry_file: defaults::default_entry_file(),
            bootstrap_file: None,
            run_timeout_secs: defaults::default_run_timeout_secs(),
            run_hz: defaults::default_run_hz(),
            lint_debounce_ms: defaults::default_lint_debounce_ms(),
            lint_workers: defaults::default_lint_workers(),
            lint_timeout_secs: defaults::default_lint_timeout_secs(),
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
        }
    }
}

impl Config {
    /// Address the HTTP surface binds to.
    #[must_use]
    pub const fn listen(&self) -> &ListenAddress {
        &self.listen
    }

    /// Root directory of the project store.
    #[must_use]
    pub fn projects_root(&self) -> &Utf8Path {
        self.projects_root.as_path()
    }

    /// Compiler executable.
    #[must_use]
    pub fn compiler_path(&self) -> &Utf8Path {
        self.compiler_path.as_path()
    }

    /// Extension required on source file names, without the dot.
    #[must_use]
    pub fn source_extension(&self) -> &str {
        self.source_extension.as_str()
    }

    /// Name of the entry file.
    #[must_use]
    pub fn entry_file(&self) -> &str {
        self.entry_file.as_str()
    }

    /// File overriding the built-in example program, when configured.
    #[must_use]
    pub fn bootstrap_file(&self) -> Option<&Utf8Path> {
        self.bootstrap_file.as_deref()
    }

    /// Wall-clock budget for a run.
    #[must_use]
    pub const fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Cycles per second handed to the runtime.
    #[must_use]
    pub const fn run_hz(&self) -> u32 {
        self.run_hz
    }

    /// Lint debounce quiet period.
    #[must_use]
    pub const fn lint_debounce(&self) -> Duration {
        Duration::from_millis(self.lint_debounce_ms)
    }

    /// Maximum number of concurrent line checks.
    #[must_use]
    pub const fn lint_workers(&self) -> usize {
        self.lint_workers
    }

    /// Wall-clock budget for a single line check.
    #[must_use]
    pub const fn lint_timeout(&self) -> Duration {
        Duration::from_secs(self.lint_timeout_secs)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Rejects values the daemon cannot operate with.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_extension.is_empty() || !self.source_extension.bytes().all(is_word_byte) {
            return Err(ConfigError::SourceExtension {
                value: self.source_extension.clone(),
            });
        }
        let expected_suffix = format!(".{}", self.source_extension);
        let entry_stem = self.entry_file.strip_suffix(expected_suffix.as_str());
        if !entry_stem.is_some_and(|stem| !stem.is_empty() && stem.bytes().all(is_word_byte)) {
            return Err(ConfigError::EntryFile {
                value: self.entry_file.clone(),
                extension: self.source_extension.clone(),
            });
        }
        if self.run_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "run_timeout_secs",
            });
        }
        if self.lint_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "lint_timeout_secs",
            });
        }
        if self.lint_workers == 0 {
            return Err(ConfigError::NoLintWorkers);
        }
        Ok(())
    }
}

const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Semantic problems detected after the layers have been merged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The extension contains characters outside `[A-Za-z0-9_]`.
    #[error("source extension '{value}' must be a non-empty word")]
    SourceExtension {
        /// Configured extension.
        value: String,
    },
    /// The entry file would itself fail file name validation.
    #[error("entry file '{value}' must look like '<word>.{extension}'")]
    EntryFile {
        /// Configured entry file.
        value: String,
        /// Configured extension.
        extension: String,
    },
    /// A timeout was configured as zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The lint worker pool would have no workers.
    #[error("lint_workers must be greater than zero")]
    NoLintWorkers,
}
