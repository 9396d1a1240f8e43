//! Configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;
use xenon_config::{Config, ListenAddress, LogFormat};

use super::playground::{ECHO_COMPILER, install_compiler};
use crate::bootstrap::ConfigLoader;

/// Loader pointing the projects root and compiler into a temporary directory.
pub struct TestConfigLoader {
    dir: TempDir,
    overrides: fn(Config) -> Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_overrides(|config| config)
    }

    /// Applies `overrides` to every configuration this loader returns.
    pub fn with_overrides(overrides: fn(Config) -> Config) -> Self {
        let dir = TempDir::new().expect("temp dir");
        install_compiler(dir.path(), ECHO_COMPILER);
        Self { dir, overrides }
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 temp path")
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let config = Config {
            listen: ListenAddress::new("127.0.0.1", 0),
            projects_root: self.path("projects"),
            compiler_path: self.path("xenoncode"),
            log_format: LogFormat::Compact,
            ..Config::default()
        };
        Ok((self.overrides)(config))
    }
}

/// Loader that fails by passing a malformed command-line value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("xenond"),
            OsString::from("--run-timeout-secs"),
            OsString::from("soon"),
        ];
        Config::load_from_iter(args)
    }
}
