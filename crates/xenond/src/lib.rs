//! HTTP daemon for the XenonCode playground.
//!
//! The daemon loads its configuration through [`xenon_config`], installs
//! structured telemetry, and serves the playground routes over HTTP:
//! loading and saving project files, streaming program runs through the
//! compiler sandbox, and answering lint requests from the debounced
//! per-line pipeline.
//!
//! Bootstrap reports every lifecycle step through a [`HealthReporter`], so
//! operators see structured events for start-up, readiness and shutdown.
//! Requests are served one thread each; runs execute on their own thread
//! and stream output as the compiler produces it.
//!
//! ## Routes
//!
//! | Request                           | Response                               |
//! |-----------------------------------|----------------------------------------|
//! | `GET /`                           | redirect to a fresh project            |
//! | `GET /<p>?loadfile=<name>`        | file bytes, example program, or empty  |
//! | `POST /<p>?savefile=<name>`       | empty; body field `content` is saved   |
//! | `GET /<p>?run`                    | chunked program output                 |
//! | `GET /<p>?listfiles`              | newline-separated file names           |
//! | `POST /<p>?lint=<name>`           | normalised text and diagnostics (JSON) |
//! | `POST /<p>?edit=<name>`           | empty; schedules a debounced check     |
//! | `GET /<p>?diagnostics=<name>`     | current diagnostics (JSON)             |
//! | `GET /healthz`                    | `ok`                                   |
//!
//! Invalid project identifiers or file names produce an empty response.

mod bootstrap;
mod health;
pub mod http;
mod process;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, SHUTDOWN_SIGNALS, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon,
};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
