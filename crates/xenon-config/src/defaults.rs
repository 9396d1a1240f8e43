//! Built-in defaults shared by the configuration loader and the daemon.

use camino::Utf8PathBuf;

use crate::listen::ListenAddress;
use crate::logging::LogFormat;

/// Default host the HTTP surface binds to.
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";

/// Default HTTP port.
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Compiler executable looked up on `PATH` when none is configured.
pub const DEFAULT_COMPILER: &str = "xenoncode";

/// Directory holding one sub-directory per project.
pub const DEFAULT_PROJECTS_ROOT: &str = "projects";

/// Extension every source file name must carry.
pub const DEFAULT_SOURCE_EXTENSION: &str = "xc";

/// File whose `init` block the compiler runs.
pub const DEFAULT_ENTRY_FILE: &str = "main.xc";

/// Wall-clock budget for one compile-and-run invocation.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 10;

/// Cycles per second passed to the runtime with `-hz`.
pub const DEFAULT_RUN_HZ: u32 = 20;

/// Quiet period before a burst of edits is linted.
pub const DEFAULT_LINT_DEBOUNCE_MS: u64 = 250;

/// Upper bound on concurrent line checks.
pub const DEFAULT_LINT_WORKERS: usize = 8;

/// Wall-clock budget for a single line check.
pub const DEFAULT_LINT_TIMEOUT_SECS: u64 = 5;

/// Default listen address for the daemon.
#[must_use]
pub fn default_listen() -> ListenAddress {
    ListenAddress::new(DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT)
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

pub(crate) fn default_projects_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PROJECTS_ROOT)
}

pub(crate) fn default_compiler_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_COMPILER)
}

pub(crate) fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_owned()
}

pub(crate) fn default_entry_file() -> String {
    DEFAULT_ENTRY_FILE.to_owned()
}

pub(crate) const fn default_run_timeout_secs() -> u64 {
    DEFAULT_RUN_TIMEOUT_SECS
}

pub(crate) const fn default_run_hz() -> u32 {
    DEFAULT_RUN_HZ
}

pub(crate) const fn default_lint_debounce_ms() -> u64 {
    DEFAULT_LINT_DEBOUNCE_MS
}

pub(crate) const fn default_lint_workers() -> usize {
    DEFAULT_LINT_WORKERS
}

pub(crate) const fn default_lint_timeout_secs() -> u64 {
    DEFAULT_LINT_TIMEOUT_SECS
}
