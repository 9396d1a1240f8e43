//! Playgrounds wired to shell-script compilers inside temporary directories.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use xenon_lint::{LintPipeline, LintSettings, ProcessLineChecker};
use xenon_sandbox::{Compiler, Sandbox};
use xenon_store::ProjectStore;

use crate::http::{Playground, PlaygroundRequest, Reply};

/// Compiler flagging lines containing `bad` and echoing `main.xc` on runs.
pub const ECHO_COMPILER: &str = r#"if [ "$1" = "-parse-line-generic" ]; then
  case "$2" in *bad*) echo "unexpected token" >&2 ;; esac
  exit 0
fi
echo "running $*"
cat main.xc"#;

/// Compiler whose runs print once and never finish.
pub const LOOPING_COMPILER: &str = "echo started\nwhile :; do sleep 1; done";

/// Writes `body` as an executable `/bin/sh` script named `xenoncode`.
pub fn install_compiler(dir: &Path, body: &str) -> PathBuf {
    let program = dir.join("xenoncode");
    fs::write(&program, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod script");
    program
}

/// A playground rooted in a temporary directory.
pub struct PlaygroundFixture {
    dir: TempDir,
    pub playground: Arc<Playground>,
}

impl PlaygroundFixture {
    /// Playground using `script` as its compiler and a ten second budget.
    pub fn with_script(script: &str) -> Self {
        Self::with_timeout(script, Duration::from_secs(10))
    }

    /// Playground using `script` with the given run budget.
    pub fn with_timeout(script: &str, run_timeout: Duration) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().join("projects");
        let playground = build(&dir, &root, script, run_timeout);
        Self { dir, playground }
    }

    /// Playground whose projects root is a regular file.
    pub fn with_unusable_root() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().join("projects");
        fs::write(&root, "not a directory").expect("write blocker");
        let playground = build(&dir, &root, ECHO_COMPILER, Duration::from_secs(10));
        Self { dir, playground }
    }

    /// Directory of `project` under the projects root.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.dir.path().join("projects").join(project)
    }

    pub fn get(&self, url: &str) -> Reply {
        self.playground.handle(&PlaygroundRequest::get(url))
    }

    pub fn post(&self, url: &str, body: &str) -> Reply {
        self.playground.handle(&PlaygroundRequest::post(url, body))
    }
}

fn build(dir: &TempDir, root: &Path, script: &str, run_timeout: Duration) -> Arc<Playground> {
    let compiler = Compiler::new(install_compiler(dir.path(), script), 20);
    let store = ProjectStore::new(root, "xc", "main.xc").expect("store");
    let checker = ProcessLineChecker::new(compiler.clone(), Duration::from_secs(5));
    let lint = LintPipeline::new(
        Arc::new(checker),
        LintSettings {
            debounce: Duration::from_millis(50),
            workers: 4,
        },
    )
    .expect("lint pipeline");
    Arc::new(Playground::new(
        store,
        Sandbox::new(compiler),
        lint,
        run_timeout,
    ))
}

/// Collects the body a reply would send, draining streams to the end.
pub fn reply_body(reply: Reply) -> Vec<u8> {
    match reply {
        Reply::Empty | Reply::Redirect(_) | Reply::Failure => Vec::new(),
        Reply::Text(bytes) => bytes,
        Reply::Json(text) => text.into_bytes(),
        Reply::Stream(receiver) => receiver.iter().flatten().collect(),
    }
}
