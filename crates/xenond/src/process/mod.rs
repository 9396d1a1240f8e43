//! Process lifecycle: start-up, signal handling and orderly shutdown.

use std::time::Duration;

mod errors;
pub(crate) mod launch;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use launch::run_daemon;
pub use shutdown::{SHUTDOWN_SIGNALS, ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
/// Longest wait for in-flight runs once shutdown has been requested.
pub(crate) const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
