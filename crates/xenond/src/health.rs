//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use xenon_config::Config;

use crate::bootstrap::BootstrapError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the HTTP listener accepts requests.
    fn listener_ready(&self, address: SocketAddr);

    /// Invoked when a shutdown has been requested.
    fn shutdown_requested(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, address: SocketAddr) {
        (**self).listener_ready(address);
    }

    fn shutdown_requested(&self) {
        (**self).shutdown_requested();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "xenond::health",
            event = "bootstrap_starting",
            "starting playground bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "xenond::health",
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            projects_root = %config.projects_root(),
            compiler = %config.compiler_path(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "playground bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "xenond::health",
            event = "bootstrap_failed",
            error = %error,
            "playground bootstrap failed"
        );
    }

    fn listener_ready(&self, address: SocketAddr) {
        tracing::info!(
            target: "xenond::health",
            event = "listener_ready",
            %address,
            "http listener ready"
        );
    }

    fn shutdown_requested(&self) {
        tracing::info!(
            target: "xenond::health",
            event = "shutdown_requested",
            "shutdown requested"
        );
    }
}
