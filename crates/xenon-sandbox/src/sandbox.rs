//! Program runs with streamed output and a wall-clock bound.

use std::io::{self, PipeReader, Read};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::command::Compiler;
use crate::error::SandboxError;
use crate::process::{self, Waited};
use crate::sink::OutputSink;

const SANDBOX_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");

/// Text streamed to the user when the compiler cannot be started.
pub const SPAWN_FAILURE_MESSAGE: &str = "ERROR: failed to start the compiler\n";

const CHUNK_SIZE: usize = 4096;

/// Terminal state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The compiler exited on its own; `-1` when a signal ended it.
    Completed(i32),
    /// The deadline passed and the process group was killed.
    TimedOut,
    /// The compiler could not be started.
    SpawnFailed {
        /// Spawn error text, for logs only.
        message: String,
    },
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    status: ExecutionStatus,
    elapsed: Duration,
    bytes: u64,
    timeout: Duration,
}

impl ExecutionOutcome {
    /// Terminal state.
    #[must_use]
    pub const fn status(&self) -> &ExecutionStatus {
        &self.status
    }

    /// Wall-clock time from spawn to exit.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of output bytes read from the child.
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Returns `true` when the run hit its deadline.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        matches!(self.status, ExecutionStatus::TimedOut)
    }

    /// Text appended to the user-visible stream after the program output.
    #[must_use]
    pub fn trailer(&self) -> Option<String> {
        match &self.status {
            ExecutionStatus::Completed(_) => None,
            ExecutionStatus::TimedOut => Some(format!(
                "\nExecution timed out after {} seconds\n",
                self.timeout.as_secs()
            )),
            ExecutionStatus::SpawnFailed { .. } => Some(SPAWN_FAILURE_MESSAGE.to_owned()),
        }
    }
}

/// Runs projects through the compiler.
#[derive(Debug, Clone)]
pub struct Sandbox {
    compiler: Compiler,
}

impl Sandbox {
    /// Creates a sandbox invoking `compiler`.
    #[must_use]
    pub const fn new(compiler: Compiler) -> Self {
        Self { compiler }
    }

    /// Compiler used for runs.
    #[must_use]
    pub const fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Compiles and runs the project in `project_dir`, streaming the merged
    /// output into `sink`.
    ///
    /// The call blocks until the child exits or `timeout` elapses. Output
    /// forwarded before a timeout is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`SandboxError`] when the output pipe cannot be created,
    /// when waiting on the child fails, or when the forwarding thread
    /// panics.
    pub fn run<S>(
        &self,
        project_dir: &Path,
        timeout: Duration,
        sink: &mut S,
    ) -> Result<ExecutionOutcome, SandboxError>
    where
        S: OutputSink + Send + ?Sized,
    {
        let started = Instant::now();
        let (reader, writer) = io::pipe().map_err(|source| SandboxError::Pipe { source })?;
        let stderr_writer = writer
            .try_clone()
            .map_err(|source| SandboxError::Pipe { source })?;

        let mut command = self.compiler.run_command(project_dir);
        command
            .stdin(std::process::Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer);

        debug!(
            target: SANDBOX_TARGET,
            program = %self.compiler.program().display(),
            project_dir = %project_dir.display(),
            "spawning compiler"
        );

        let mut child = match process::spawn_in_group(command) {
            Ok(child) => child,
            Err(error) => {
                warn!(
                    target: SANDBOX_TARGET,
                    program = %self.compiler.program().display(),
                    %error,
                    "failed to start the compiler"
                );
                return Ok(ExecutionOutcome {
                    status: ExecutionStatus::SpawnFailed {
                        message: error.to_string(),
                    },
                    elapsed: started.elapsed(),
                    bytes: 0,
                    timeout,
                });
            }
        };

        let (waited, forwarded) = thread::scope(|scope| {
            let forwarder = scope.spawn(move || forward(reader, sink));
            let exit = process::wait_with_deadline(&mut child, timeout);
            (exit, forwarder.join())
        });
        let bytes = forwarded.map_err(|_| SandboxError::ForwarderPanicked)?;
        let status = match waited.map_err(|source| SandboxError::Wait { source })? {
            Waited::Exited(exit) => ExecutionStatus::Completed(exit.code().unwrap_or(-1)),
            Waited::TimedOut => ExecutionStatus::TimedOut,
        };

        let outcome = ExecutionOutcome {
            status,
            elapsed: started.elapsed(),
            bytes,
            timeout,
        };
        info!(
            target: SANDBOX_TARGET,
            project_dir = %project_dir.display(),
            status = ?outcome.status,
            elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            bytes = outcome.bytes,
            "run finished"
        );
        Ok(outcome)
    }
}

/// Copies the pipe into `sink` until every writer has closed.
fn forward<S>(mut reader: PipeReader, sink: &mut S) -> u64
where
    S: OutputSink + ?Sized,
{
    let mut buffer = [0_u8; CHUNK_SIZE];
    let mut total = 0_u64;
    let mut sink_open = true;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => {
                debug!(target: SANDBOX_TARGET, %error, "output pipe read failed");
                break;
            }
        };
        total = total.saturating_add(u64::try_from(read).unwrap_or(u64::MAX));
        if !sink_open {
            continue;
        }
        let Some(chunk) = buffer.get(..read) else {
            break;
        };
        if let Err(error) = sink.accept(chunk) {
            debug!(target: SANDBOX_TARGET, %error, "output sink closed, draining");
            sink_open = false;
        }
    }
    total
}
