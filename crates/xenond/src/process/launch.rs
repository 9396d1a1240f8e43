//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::http::HttpServer;

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
    pub(crate) drain_timeout: Duration,
}

/// Runs the daemon using the production collaborators.
///
/// Blocks until a termination signal arrives, then stops accepting requests
/// and waits up to ten seconds for running programs to finish.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, binding or signal handling fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::install()?,
        drain_timeout: SHUTDOWN_TIMEOUT,
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
        drain_timeout,
    } = plan;

    let daemon = bootstrap_with(&loader, Arc::clone(&reporter))?;
    let server = HttpServer::bind(daemon.config().listen())?;
    let playground = daemon.playground();
    let handle = server.start(Arc::clone(&playground))?;
    reporter.listener_ready(handle.local_addr());

    shutdown.wait()?;
    reporter.shutdown_requested();
    handle.shutdown();
    handle.join()?;
    if !playground.wait_for_idle(drain_timeout) {
        warn!(
            target: PROCESS_TARGET,
            active_runs = playground.active_runs(),
            "runs still active after the shutdown budget"
        );
    }
    drop(playground);
    drop(daemon);
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
