//! Error types for the HTTP server.

use std::io;

use thiserror::Error;

/// Errors surfaced while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind HTTP listener at {address}: {source}")]
    Bind {
        /// Configured `host:port`.
        address: String,
        /// Underlying failure reported by the HTTP library.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// The bound listener did not report an IP socket address.
    #[error("HTTP listener at {address} has no IP address")]
    Address {
        /// Configured `host:port`.
        address: String,
    },
    /// The accept thread could not be started.
    #[error("failed to start the accept thread: {source}")]
    Spawn {
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked.
    #[error("HTTP accept thread panicked")]
    ThreadPanic,
}
