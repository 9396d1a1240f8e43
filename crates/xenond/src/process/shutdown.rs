//! Termination signal handling.
//!
//! Handlers are installed before bootstrap, so a signal sent while the
//! playground is still starting is queued instead of killing the process
//! with runs half spawned. How long in-flight runs may drain afterwards is
//! the launcher's concern, not the listener's.

use std::io;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{debug, info};

use super::PROCESS_TARGET;

/// Signals that stop the playground.
pub const SHUTDOWN_SIGNALS: [i32; 3] = [SIGTERM, SIGINT, SIGHUP];

/// Blocks the launcher until the playground should stop.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification cannot be awaited.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Listener for [`SHUTDOWN_SIGNALS`].
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
}

impl SystemShutdownSignal {
    /// Installs the handlers; signals arriving from now on are queued.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when registration fails.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals =
            Signals::new(SHUTDOWN_SIGNALS).map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals: Mutex::new(signals),
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let received = signals.forever().next();
        drop(signals);
        received.map_or_else(
            || debug!(target: PROCESS_TARGET, "signal handle closed"),
            |signal| info!(target: PROCESS_TARGET, signal, "shutdown signal received"),
        );
        Ok(())
    }
}
