//! Process-group spawning and deadline enforcement.
//!
//! Shared by program runs and single-line checks: both spawn the compiler in
//! a fresh process group and poll it against a wall-clock deadline.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{Id, WaitPidFlag, WaitStatus, waitid};
use nix::unistd::Pid;
use tracing::{debug, warn};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Interval between exit polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a bounded wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waited {
    /// The child exited on its own.
    Exited(ExitStatus),
    /// The deadline passed and the process group was killed.
    TimedOut,
}

/// Spawns `command` as the leader of a new process group.
///
/// The command is consumed so any pipe ends it holds are closed once the
/// child has started.
///
/// # Errors
///
/// Returns the spawn error when the program cannot be started.
pub fn spawn_in_group(mut command: Command) -> io::Result<Child> {
    command.process_group(0);
    command.spawn()
}

/// Waits for `child` to exit, killing its process group once `timeout` has
/// elapsed.
///
/// After a normal exit any processes left behind in the group are killed as
/// well, so nothing the program started outlives it. The leader is only
/// reaped after the group kill: until then its zombie keeps the process group
/// ID reserved.
///
/// # Errors
///
/// Returns an error when polling or reaping the child fails.
pub fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Waited> {
    let start = Instant::now();
    loop {
        if has_exited(child)? {
            kill_group(child);
            let status = child.wait()?;
            debug!(target: PROCESS_TARGET, pid = child.id(), ?status, "process exited");
            return Ok(Waited::Exited(status));
        }
        if start.elapsed() >= timeout {
            warn!(
                target: PROCESS_TARGET,
                pid = child.id(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "deadline passed, killing process group"
            );
            kill_group(child);
            child.wait()?;
            return Ok(Waited::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reports whether `child` has exited, leaving it unreaped.
fn has_exited(child: &mut Child) -> io::Result<bool> {
    let Ok(raw) = i32::try_from(child.id()) else {
        return child.try_wait().map(|status| status.is_some());
    };
    let flags = WaitPidFlag::WEXITED | WaitPidFlag::WNOHANG | WaitPidFlag::WNOWAIT;
    match waitid(Id::Pid(Pid::from_raw(raw)), flags) {
        Ok(WaitStatus::StillAlive) => Ok(false),
        Ok(_) => Ok(true),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

/// Sends `SIGKILL` to the child's process group.
///
/// Falls back to killing only the child when the group signal cannot be
/// delivered. A group that is already empty is not an error.
pub fn kill_group(child: &mut Child) {
    let Ok(raw) = i32::try_from(child.id()) else {
        drop(child.kill());
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(errno) => {
            debug!(
                target: PROCESS_TARGET,
                pid = raw,
                %errno,
                "process group kill failed, killing child only"
            );
            drop(child.kill());
        }
    }
}
