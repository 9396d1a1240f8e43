//! Single-line checks against the compiler.

use std::io::{self, Read};
use std::process::Stdio;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use xenon_sandbox::Compiler;
use xenon_sandbox::process::{self, Waited};

const CHECKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::checker");

/// Failures that prevent a line from being checked.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    /// The compiler could not be started.
    #[error("failed to start the line checker: {source}")]
    Spawn {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The check did not finish within its budget.
    #[error("line check timed out after {timeout_ms} ms")]
    Timeout {
        /// Budget that was exceeded.
        timeout_ms: u64,
    },
    /// Reading the checker output or waiting on it failed.
    #[error("line check failed: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Checks one line of source in isolation.
///
/// Implementations must be shareable across the lint worker threads.
pub trait LineChecker: Send + Sync {
    /// Returns the error message for `line`, or `None` when it parses.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the check itself could not run.
    fn check(&self, line: &str) -> Result<Option<String>, CheckError>;
}

/// Runs `<compiler> -parse-line-generic <line>` for every check.
///
/// Anything the compiler writes to standard error is the diagnostic message;
/// silence means the line is valid.
#[derive(Debug, Clone)]
pub struct ProcessLineChecker {
    compiler: Compiler,
    timeout: Duration,
}

impl ProcessLineChecker {
    /// Creates a checker invoking `compiler`, bounding each check by
    /// `timeout`.
    #[must_use]
    pub const fn new(compiler: Compiler, timeout: Duration) -> Self {
        Self { compiler, timeout }
    }
}

impl LineChecker for ProcessLineChecker {
    fn check(&self, line: &str) -> Result<Option<String>, CheckError> {
        let mut command = self.compiler.parse_line_command(line);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = process::spawn_in_group(command).map_err(|error| CheckError::Spawn {
            source: Arc::new(error),
        })?;
        let stderr = child.stderr.take();

        let (waited, captured) = thread::scope(|scope| {
            let reader = scope.spawn(move || read_all(stderr));
            let exit = process::wait_with_deadline(&mut child, self.timeout);
            (exit, reader.join())
        });

        let io_error = |error: io::Error| CheckError::Io {
            source: Arc::new(error),
        };
        match waited.map_err(io_error)? {
            Waited::TimedOut => {
                return Err(CheckError::Timeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            Waited::Exited(status) => {
                debug!(target: CHECKER_TARGET, ?status, "line check finished");
            }
        }
        let message = captured
            .unwrap_or_else(|_| Err(io::Error::other("stderr reader panicked")))
            .map_err(io_error)?;
        let trimmed = message.trim_end();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_owned()))
        }
    }
}

fn read_all(stream: Option<impl Read>) -> io::Result<String> {
    let mut buffer = String::new();
    if let Some(mut reader) = stream {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        buffer = String::from_utf8_lossy(&bytes).into_owned();
    }
    Ok(buffer)
}
