//! Daemon bootstrap orchestration.

use std::fs;
use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use xenon_config::{Config, ConfigError};
use xenon_lint::{LintPipeline, LintSettings, ProcessLineChecker};
use xenon_sandbox::{Compiler, Sandbox};
use xenon_store::{ProjectStore, StoreError};

use crate::health::HealthReporter;
use crate::http::Playground;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader failure shared with `ortho_config`.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The merged configuration holds unusable values.
    #[error("invalid configuration: {source}")]
    Validation {
        /// Rejected value.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configured example program could not be read.
    #[error("failed to read bootstrap file '{path}': {source}")]
    BootstrapFile {
        /// Configured file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The project store rejected its settings.
    #[error("failed to open the project store: {source}")]
    Store {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
    /// The lint pipeline threads could not be started.
    #[error("failed to start the lint pipeline: {source}")]
    Lint {
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    playground: Arc<Playground>,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Services answering HTTP requests.
    #[must_use]
    pub fn playground(&self) -> Arc<Playground> {
        Arc::clone(&self.playground)
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first step that fails; the reporter
/// sees the same error before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match assemble(loader) {
        Ok(daemon) => {
            reporter.bootstrap_succeeded(&daemon.config);
            Ok(daemon)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn assemble(loader: &dyn ConfigLoader) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::Validation { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;

    let store = open_store(&config)?;
    let compiler = Compiler::new(config.compiler_path().as_std_path(), config.run_hz());
    let checker = ProcessLineChecker::new(compiler.clone(), config.lint_timeout());
    let lint = LintPipeline::new(
        Arc::new(checker),
        LintSettings {
            debounce: config.lint_debounce(),
            workers: config.lint_workers(),
        },
    )
    .map_err(|source| BootstrapError::Lint { source })?;
    let playground = Playground::new(store, Sandbox::new(compiler), lint, config.run_timeout());

    Ok(Daemon {
        config,
        playground: Arc::new(playground),
        telemetry,
    })
}

fn open_store(config: &Config) -> Result<ProjectStore, BootstrapError> {
    let store = ProjectStore::new(
        config.projects_root().as_std_path(),
        config.source_extension(),
        config.entry_file(),
    )
    .map_err(|source| BootstrapError::Store { source })?;
    let Some(path) = config.bootstrap_file() else {
        return Ok(store);
    };
    let example = fs::read(path).map_err(|source| BootstrapError::BootstrapFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(store.with_bootstrap(example))
}
