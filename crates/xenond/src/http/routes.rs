//! Request handling for the playground surface.
//!
//! Every route answers with an empty successful response when the project
//! identifier or file name is invalid. Only store failures surface as an
//! error status.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;
use xenon_lint::{Diagnostic, LintPipeline, normalize_document};
use xenon_sandbox::Sandbox;
use xenon_store::{FileName, ProjectId, ProjectLock, ProjectStore};

use super::query::{CONTENT_FIELD, RequestTarget, form_field};

const ROUTES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::http::routes");

const HEALTH_PATH: &str = "healthz";

/// Request data the playground needs, detached from the HTTP library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaygroundRequest {
    /// Request target, for example `/abc?loadfile=main.xc`.
    pub url: String,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl PlaygroundRequest {
    /// Builds a request without a body.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: Vec::new(),
        }
    }

    /// Builds a request carrying a form body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Outcome of a handled request.
#[derive(Debug)]
pub enum Reply {
    /// Empty successful response.
    Empty,
    /// Plain text or raw file bytes.
    Text(Vec<u8>),
    /// JSON document.
    Json(String),
    /// Redirect to the given location.
    Redirect(String),
    /// Streamed program output, ending when the sender hangs up.
    Stream(Receiver<Vec<u8>>),
    /// Internal failure; answered with status 500 and no body.
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Load(String),
    Save(String),
    Run,
    List,
    Lint(String),
    Edit(String),
    Diagnostics(String),
    Nothing,
}

impl Action {
    fn from_target(target: &RequestTarget) -> Self {
        let named = |key: &str| target.param(key).map(str::to_owned);
        if let Some(name) = named("loadfile") {
            Self::Load(name)
        } else if let Some(name) = named("savefile") {
            Self::Save(name)
        } else if target.has("run") {
            Self::Run
        } else if target.has("listfiles") {
            Self::List
        } else if let Some(name) = named("lint") {
            Self::Lint(name)
        } else if let Some(name) = named("edit") {
            Self::Edit(name)
        } else if let Some(name) = named("diagnostics") {
            Self::Diagnostics(name)
        } else {
            Self::Nothing
        }
    }
}

#[derive(Debug, Serialize)]
struct LintReply<'a> {
    text: &'a str,
    diagnostics: &'a [Diagnostic],
}

/// The playground services behind the HTTP surface.
pub struct Playground {
    store: ProjectStore,
    sandbox: Sandbox,
    lint: LintPipeline,
    run_timeout: Duration,
    active_runs: Arc<AtomicUsize>,
}

impl Playground {
    /// Wires the services together.
    #[must_use]
    pub fn new(
        store: ProjectStore,
        sandbox: Sandbox,
        lint: LintPipeline,
        run_timeout: Duration,
    ) -> Self {
        Self {
            store,
            sandbox,
            lint,
            run_timeout,
            active_runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Project store backing load and save.
    #[must_use]
    pub const fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Number of runs still executing.
    #[must_use]
    pub fn active_runs(&self) -> usize {
        self.active_runs.load(Ordering::SeqCst)
    }

    /// Waits until no run is executing or `timeout` elapses.
    ///
    /// Returns `true` when every run finished in time.
    #[must_use]
    pub fn wait_for_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.active_runs() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(xenon_sandbox::process::POLL_INTERVAL);
        }
        true
    }

    /// Handles one request.
    #[must_use]
    pub fn handle(&self, request: &PlaygroundRequest) -> Reply {
        let target = RequestTarget::parse(&request.url);
        let action = Action::from_target(&target);

        if target.is_path(HEALTH_PATH) && action == Action::Nothing {
            return Reply::Text(b"ok".to_vec());
        }
        let Some(candidate) = target.project() else {
            return if action == Action::Nothing && target.is_root() {
                Reply::Redirect(format!("/{}", Uuid::new_v4().simple()))
            } else {
                Reply::Empty
            };
        };
        let Ok(project) = self.store.project_id(candidate) else {
            debug!(target: ROUTES_TARGET, "rejected project identifier");
            return Reply::Empty;
        };

        match action {
            Action::Load(name) => self.with_file(&name, |file| self.load(&project, &file)),
            Action::Save(name) => self.with_file(&name, |file| {
                form_field(&request.body, CONTENT_FIELD)
                    .map_or(Reply::Empty, |content| self.save(&project, &file, &content))
            }),
            Action::Run => self.run(&project),
            Action::List => self.list(&project),
            Action::Lint(name) => self.with_file(&name, |file| {
                form_field(&request.body, CONTENT_FIELD).map_or(Reply::Empty, |content| {
                    self.lint_now(&document_id(&project, &file), &content)
                })
            }),
            Action::Edit(name) => self.with_file(&name, |file| {
                if let Some(content) = form_field(&request.body, CONTENT_FIELD) {
                    self.lint.edit(&document_id(&project, &file), &content);
                }
                Reply::Empty
            }),
            Action::Diagnostics(name) => self.with_file(&name, |file| {
                json(&self.lint.diagnostics(&document_id(&project, &file)))
            }),
            Action::Nothing => Reply::Empty,
        }
    }

    fn with_file(&self, candidate: &str, route: impl FnOnce(FileName) -> Reply) -> Reply {
        self.store.file_name(candidate).map_or_else(
            |_| {
                debug!(target: ROUTES_TARGET, "rejected file name");
                Reply::Empty
            },
            route,
        )
    }

    fn load(&self, project: &ProjectId, file: &FileName) -> Reply {
        match self.store.load(project, file) {
            Ok(outcome) => Reply::Text(outcome.into_body()),
            Err(error) => {
                error!(target: ROUTES_TARGET, %error, "load failed");
                Reply::Failure
            }
        }
    }

    fn save(&self, project: &ProjectId, file: &FileName, content: &str) -> Reply {
        match self.store.save(project, file, content.as_bytes()) {
            Ok(()) => Reply::Empty,
            Err(error) => {
                error!(target: ROUTES_TARGET, %error, "save failed");
                Reply::Failure
            }
        }
    }

    fn list(&self, project: &ProjectId) -> Reply {
        match self.store.list(project) {
            Ok(files) => {
                let names: Vec<&str> = files.iter().map(FileName::as_str).collect();
                Reply::Text(names.join("\n").into_bytes())
            }
            Err(error) => {
                error!(target: ROUTES_TARGET, %error, "listing failed");
                Reply::Failure
            }
        }
    }

    fn lint_now(&self, document: &str, content: &str) -> Reply {
        let text = normalize_document(content);
        let snapshot = self.lint.lint_now(document, content);
        json(&LintReply {
            text: &text,
            diagnostics: &snapshot.diagnostics,
        })
    }

    fn run(&self, project: &ProjectId) -> Reply {
        if !self.store.exists(project) {
            return Reply::Empty;
        }
        let (sender, receiver) = mpsc::channel();
        let job = RunJob {
            sandbox: self.sandbox.clone(),
            lock: self.store.lock_for(project),
            project_dir: self.store.project_dir(project),
            timeout: self.run_timeout,
            active: ActiveRun::enter(&self.active_runs),
            sender,
        };
        match thread::Builder::new()
            .name(String::from("xenon-run"))
            .spawn(move || job.execute())
        {
            Ok(_) => Reply::Stream(receiver),
            Err(error) => {
                error!(target: ROUTES_TARGET, %error, "failed to start run thread");
                Reply::Failure
            }
        }
    }
}

struct RunJob {
    sandbox: Sandbox,
    lock: ProjectLock,
    project_dir: PathBuf,
    timeout: Duration,
    active: ActiveRun,
    sender: Sender<Vec<u8>>,
}

impl RunJob {
    fn execute(mut self) {
        let _guard = self.lock.read();
        match self
            .sandbox
            .run(&self.project_dir, self.timeout, &mut self.sender)
        {
            Ok(outcome) => {
                if let Some(trailer) = outcome.trailer()
                    && self.sender.send(trailer.into_bytes()).is_err()
                {
                    debug!(target: ROUTES_TARGET, "client left before the run ended");
                }
            }
            Err(error) => {
                warn!(target: ROUTES_TARGET, %error, "run failed");
            }
        }
        drop(self.active);
    }
}

/// Counts a run as active until dropped.
struct ActiveRun {
    counter: Arc<AtomicUsize>,
}

impl ActiveRun {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

fn document_id(project: &ProjectId, file: &FileName) -> String {
    format!("{project}/{file}")
}

fn json<T: Serialize>(value: &T) -> Reply {
    match serde_json::to_string(value) {
        Ok(body) => Reply::Json(body),
        Err(error) => {
            error!(target: ROUTES_TARGET, %error, "failed to encode response");
            Reply::Failure
        }
    }
}
