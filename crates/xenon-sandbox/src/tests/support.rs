//! Fake compilers backed by shell scripts.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::{Compiler, Sandbox};

/// Temporary workspace holding a fake compiler and one project directory.
pub(super) struct FakeCompiler {
    _root: TempDir,
    pub(super) program: PathBuf,
    pub(super) project_dir: PathBuf,
}

impl FakeCompiler {
    /// Installs `body` as a `/bin/sh` script acting as the compiler.
    pub(super) fn with_script(body: &str) -> Self {
        let root = TempDir::new().expect("temp dir");
        let program = root.path().join("xenoncode");
        fs::write(&program, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod script");
        let project_dir = root.path().join("project");
        fs::create_dir(&project_dir).expect("project dir");
        fs::write(project_dir.join("main.xc"), "init\n").expect("main.xc");
        Self {
            _root: root,
            program,
            project_dir,
        }
    }

    /// Sandbox pointed at the script.
    pub(super) fn sandbox(&self) -> Sandbox {
        Sandbox::new(Compiler::new(&self.program, 20))
    }
}
