//! Domain errors raised by the execution sandbox.

use std::io;

use thiserror::Error;

/// Failures of the sandbox machinery itself.
///
/// A compiler that cannot be started, exits non-zero or runs out of time is
/// not an error; those are reported through
/// [`ExecutionStatus`](crate::ExecutionStatus).
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The shared output pipe could not be created.
    #[error("failed to create output pipe: {source}")]
    Pipe {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Polling or reaping the child failed.
    #[error("failed to wait for the compiler process: {source}")]
    Wait {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The thread forwarding output panicked.
    #[error("output forwarding thread panicked")]
    ForwarderPanicked,
}
