//! Defines the error surface for daemon launch and supervision.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::http::ServerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// The HTTP server failed to bind or stop.
    #[error("HTTP server failed: {source}")]
    Server {
        /// Underlying server error.
        #[source]
        source: ServerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ServerError> for LaunchError {
    fn from(source: ServerError) -> Self {
        Self::Server { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
