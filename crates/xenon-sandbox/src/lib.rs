//! Bounded execution of the XenonCode compiler.
//!
//! The [`Sandbox`] compiles and runs a project in one compiler invocation,
//! using the project directory as the working directory. Standard output and
//! standard error share a single pipe so the caller sees them interleaved in
//! the order the program wrote them. Every chunk is handed to an
//! [`OutputSink`] as soon as it is read.
//!
//! Each invocation is bounded by a wall-clock deadline. The child runs in
//! its own process group and the whole group is killed when the deadline
//! passes, so helper processes spawned by the program die with it.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use xenon_sandbox::{Compiler, Sandbox};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sandbox = Sandbox::new(Compiler::new("xenoncode", 20));
//! let mut output = Vec::new();
//! let outcome = sandbox.run(Path::new("projects/demo"), Duration::from_secs(10), &mut output)?;
//! println!("{:?} after {:?}", outcome.status(), outcome.elapsed());
//! # Ok(()) }
//! ```
//!
//! Concurrent runs share no state. There is no global limit on how many may
//! execute at once.

mod command;
mod error;
pub mod process;
mod sandbox;
mod sink;

pub use command::Compiler;
pub use error::SandboxError;
pub use sandbox::{ExecutionOutcome, ExecutionStatus, SPAWN_FAILURE_MESSAGE, Sandbox};
pub use sink::OutputSink;

#[cfg(test)]
mod tests;
