//! Pipeline and checker tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use mockall::mock;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use xenon_sandbox::Compiler;

use crate::{CheckError, LineChecker, LintPipeline, LintSettings, ProcessLineChecker, Severity};


mock! {
    Checker {}
    impl LineChecker for Checker {
        fn check(&self, line: &str) -> Result<Option<String>, CheckError>;
    }
}

/// Checker flagging every line containing `bad` and remembering each call.
#[derive(Default)]
pub(super) struct RecordingChecker {
    calls: Mutex<Vec<String>>,
}

impl RecordingChecker {
    pub(super) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LineChecker for RecordingChecker {
    fn check(&self, line: &str) -> Result<Option<String>, CheckError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
        Ok(line
            .contains("bad")
            .then(|| String::from("unexpected token")))
    }
}

/// Recording checker that takes `delay` over every line.
struct SlowChecker {
    inner: RecordingChecker,
    delay: Duration,
}

impl LineChecker for SlowChecker {
    fn check(&self, line: &str) -> Result<Option<String>, CheckError> {
        thread::sleep(self.delay);
        self.inner.check(line)
    }
}

pub(super) fn settings() -> LintSettings {
    LintSettings {
        debounce: Duration::from_millis(60),
        workers: 4,
    }
}

#[fixture]
fn recording() -> Arc<RecordingChecker> {
    Arc::new(RecordingChecker::default())
}

#[rstest]
fn rapid_edits_check_only_the_latest_text(recording: Arc<RecordingChecker>) {
    let pipeline = LintPipeline::new(recording.clone(), settings()).expect("pipeline");
    pipeline.edit("p/main.xc", "init\n    first");
    pipeline.edit("p/main.xc", "init\n    second");
    pipeline.edit("p/main.xc", "init\n    third bad");

    thread::sleep(Duration::from_millis(400));
    let mut calls = recording.calls();
    calls.sort();
    assert_eq!(calls, ["\tthird bad", "init"]);

    let snapshot = pipeline.diagnostics("p/main.xc");
    assert!(snapshot.complete);
    assert_eq!(snapshot.diagnostics.len(), 1);
    let diagnostic = snapshot.diagnostics.first().expect("diagnostic");
    assert_eq!(diagnostic.line, 1);
    assert_eq!(diagnostic.columns, 0..10);
    assert_eq!(diagnostic.severity, Severity::Error);
}

#[rstest]
fn lint_now_reports_each_failing_line(recording: Arc<RecordingChecker>) {
    let pipeline = LintPipeline::new(recording, settings()).expect("pipeline");
    let snapshot = pipeline.lint_now("doc", "bad one\nfine\n\nbad two\n");
    assert!(snapshot.complete);
    let lines: Vec<usize> = snapshot
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.line)
        .collect();
    assert_eq!(lines, [0, 3]);
}

#[rstest]
fn blank_lines_are_not_checked(recording: Arc<RecordingChecker>) {
    let pipeline = LintPipeline::new(recording.clone(), settings()).expect("pipeline");
    let snapshot = pipeline.lint_now("doc", "\n    \n\t\n");
    assert!(snapshot.complete);
    assert!(recording.calls().is_empty());
}

#[rstest]
fn close_forgets_diagnostics(recording: Arc<RecordingChecker>) {
    let pipeline = LintPipeline::new(recording, settings()).expect("pipeline");
    let snapshot = pipeline.lint_now("doc", "bad");
    assert_eq!(snapshot.diagnostics.len(), 1);
    pipeline.close("doc");
    assert!(pipeline.diagnostics("doc").diagnostics.is_empty());
}

#[test]
fn checker_failures_yield_no_diagnostic() {
    let mut checker = MockChecker::new();
    checker.expect_check().returning(|line| {
        if line == "slow" {
            Err(CheckError::Timeout { timeout_ms: 5 })
        } else {
            Ok(Some(String::from("nope")))
        }
    });
    let pipeline = LintPipeline::new(Arc::new(checker), settings()).expect("pipeline");
    let snapshot = pipeline.lint_now("doc", "slow\nwrong");
    assert!(snapshot.complete);
    assert_eq!(snapshot.diagnostics.len(), 1);
    assert_eq!(
        snapshot.diagnostics.first().map(|found| found.line),
        Some(1)
    );
}

#[test]
fn checker_sees_normalised_indentation() {
    let mut checker = MockChecker::new();
    checker.expect_check().once().returning(|line| {
        Ok((line != "\t\tprint(\"x\")").then(|| format!("unexpected {line:?}")))
    });
    let pipeline = LintPipeline::new(Arc::new(checker), settings()).expect("pipeline");
    let snapshot = pipeline.lint_now("doc", "        print(\"x\")");
    assert!(snapshot.diagnostics.is_empty());
}

#[test]
fn newer_cycle_replaces_older_results() {
    let recording = Arc::new(RecordingChecker::default());
    let pipeline = LintPipeline::new(recording, settings()).expect("pipeline");
    let first = pipeline.lint_now("doc", "bad");
    let second = pipeline.lint_now("doc", "good");
    assert!(second.generation > first.generation);
    assert!(second.diagnostics.is_empty());
}

#[test]
fn superseded_cycles_skip_queued_lines() {
    let checker = Arc::new(SlowChecker {
        inner: RecordingChecker::default(),
        delay: Duration::from_millis(50),
    });
    let single = LintSettings {
        workers: 1,
        ..settings()
    };
    let pipeline = LintPipeline::new(checker.clone(), single).expect("pipeline");
    let old_text: String = (0..20).map(|number| format!("old {number}\n")).collect();

    thread::scope(|scope| {
        let stale = scope.spawn(|| pipeline.lint_now("doc", &old_text));
        thread::sleep(Duration::from_millis(80));
        let started = Instant::now();
        let fresh = pipeline.lint_now("doc", "new");
        assert!(
            started.elapsed() < Duration::from_millis(500),
            "fresh cycle waited {:?}",
            started.elapsed()
        );
        assert!(fresh.complete);
        stale.join().expect("stale cycle");
    });

    let stale_checks = checker
        .inner
        .calls()
        .iter()
        .filter(|line| line.starts_with("old"))
        .count();
    assert!(stale_checks < 5, "{stale_checks} stale lines were checked");
}

fn fake_compiler(root: &TempDir) -> Compiler {
    let program = root.path().join("xenoncode");
    let script = "#!/bin/sh\n\
                  case \"$2\" in\n\
                  *bad*) echo \"unexpected token\" >&2 ;;\n\
                  *hang*) sleep 30 ;;\n\
                  esac\n";
    fs::write(&program, script).expect("write script");
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod");
    Compiler::new(program, 20)
}

#[test]
fn process_checker_reads_stderr() {
    let root = TempDir::new().expect("temp dir");
    let checker = ProcessLineChecker::new(fake_compiler(&root), Duration::from_secs(5));
    assert_eq!(checker.check("\tprint(\"ok\")").expect("check"), None);
    assert_eq!(
        checker.check("bad line").expect("check"),
        Some(String::from("unexpected token"))
    );
}

#[test]
fn process_checker_enforces_its_deadline() {
    let root = TempDir::new().expect("temp dir");
    let checker = ProcessLineChecker::new(fake_compiler(&root), Duration::from_millis(200));
    let error = checker.check("hang").expect_err("must time out");
    assert!(matches!(error, CheckError::Timeout { timeout_ms: 200 }));
}

#[test]
fn process_checker_reports_missing_compiler() {
    let root = TempDir::new().expect("temp dir");
    let checker = ProcessLineChecker::new(
        Compiler::new(root.path().join("absent"), 20),
        Duration::from_secs(1),
    );
    assert!(matches!(
        checker.check("init"),
        Err(CheckError::Spawn { .. })
    ));
}
