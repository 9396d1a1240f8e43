//! Test double for [`HealthReporter`] that records structured events.

use std::net::SocketAddr;
use std::sync::Mutex;

use xenon_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerReady(SocketAddr),
    ShutdownRequested,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, address: SocketAddr) {
        self.record(HealthEvent::ListenerReady(address));
    }

    fn shutdown_requested(&self) {
        self.record(HealthEvent::ShutdownRequested);
    }
}
