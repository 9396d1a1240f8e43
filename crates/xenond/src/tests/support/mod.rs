//! Test harness utilities for the daemon suites.

mod config_loader;
mod playground;
mod reporter;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use playground::{ECHO_COMPILER, LOOPING_COMPILER, PlaygroundFixture, reply_body};
pub use reporter::{HealthEvent, RecordingHealthReporter};
