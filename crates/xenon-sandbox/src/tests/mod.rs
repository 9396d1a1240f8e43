//! Crate-level tests running fake compilers.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::{Compiler, ExecutionStatus, SPAWN_FAILURE_MESSAGE, Sandbox};

mod support;

use support::FakeCompiler;

const GENEROUS: Duration = Duration::from_secs(10);

#[test]
fn run_passes_fixed_arguments_in_project_dir() {
    let fake = FakeCompiler::with_script("echo \"args: $*\"\necho \"cwd: $(pwd)\"");
    let mut output = Vec::new();
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, GENEROUS, &mut output)
        .expect("run");

    let text = String::from_utf8(output).expect("utf8");
    let canonical = fake.project_dir.canonicalize().expect("canonical");
    assert!(text.contains("args: -compile . -hz 20 -run ."), "{text}");
    assert!(
        text.contains(&format!("cwd: {}", canonical.display())),
        "{text}"
    );
    assert_eq!(outcome.status(), &ExecutionStatus::Completed(0));
    assert_eq!(outcome.trailer(), None);
}

#[test]
fn stdout_and_stderr_share_one_stream() {
    let fake = FakeCompiler::with_script("echo one\necho two >&2\necho three\nexit 3");
    let mut output = Vec::new();
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, GENEROUS, &mut output)
        .expect("run");

    assert_eq!(output, b"one\ntwo\nthree\n");
    assert_eq!(outcome.status(), &ExecutionStatus::Completed(3));
    assert_eq!(outcome.bytes(), 14);
}

#[test]
fn infinite_loop_is_killed_with_partial_output() {
    let fake = FakeCompiler::with_script("echo partial\nwhile :; do sleep 1; done");
    let mut output = Vec::new();
    let timeout = Duration::from_millis(400);
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, timeout, &mut output)
        .expect("run");

    assert!(outcome.timed_out());
    assert_eq!(output, b"partial\n");
    assert!(outcome.elapsed() < Duration::from_secs(5), "{:?}", outcome.elapsed());
}

#[test]
fn timeout_trailer_names_the_budget() {
    let fake = FakeCompiler::with_script("sleep 30");
    let mut output = Vec::new();
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, Duration::from_secs(1), &mut output)
        .expect("run");
    assert_eq!(
        outcome.trailer().as_deref(),
        Some("\nExecution timed out after 1 seconds\n")
    );
}

#[test]
fn background_children_die_with_the_run() {
    let fake = FakeCompiler::with_script("echo started\nsleep 30 &\nwait");
    let mut output = Vec::new();
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, Duration::from_millis(400), &mut output)
        .expect("run");
    assert!(outcome.timed_out());
    assert!(outcome.elapsed() < Duration::from_secs(5));
}

#[test]
fn lingering_children_are_killed_after_a_normal_exit() {
    let fake = FakeCompiler::with_script(
        "sleep 30 >/dev/null 2>&1 &\necho $! > sleeper.pid\necho done",
    );
    let mut output = Vec::new();
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, GENEROUS, &mut output)
        .expect("run");
    assert_eq!(outcome.status(), &ExecutionStatus::Completed(0));
    assert_eq!(output, b"done\n");

    let pid = fs::read_to_string(fake.project_dir.join("sleeper.pid")).expect("pid file");
    let stat = Path::new("/proc").join(pid.trim()).join("stat");
    let start = Instant::now();
    while fs::read_to_string(&stat).is_ok_and(|text| !text.contains(") Z ")) {
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "background sleeper outlived the run"
        );
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn missing_compiler_is_reported_as_spawn_failure() {
    let root = tempfile::tempdir().expect("temp dir");
    let sandbox = Sandbox::new(Compiler::new(root.path().join("absent"), 20));
    let mut output = Vec::new();
    let outcome = sandbox
        .run(root.path(), GENEROUS, &mut output)
        .expect("run");

    assert!(matches!(
        outcome.status(),
        ExecutionStatus::SpawnFailed { .. }
    ));
    assert!(output.is_empty());
    assert_eq!(outcome.trailer().as_deref(), Some(SPAWN_FAILURE_MESSAGE));
}

#[test]
fn output_streams_before_the_child_exits() {
    let fake = FakeCompiler::with_script("echo early\nsleep 1\necho late");
    let (mut sender, receiver) = mpsc::channel::<Vec<u8>>();
    let sandbox = fake.sandbox();
    let project_dir = fake.project_dir.clone();
    let handle = thread::spawn(move || sandbox.run(&project_dir, GENEROUS, &mut sender));

    let first = receiver
        .recv_timeout(Duration::from_millis(900))
        .expect("first chunk arrives while the child sleeps");
    assert_eq!(first, b"early\n");
    let outcome = handle.join().expect("join").expect("run");
    assert_eq!(outcome.status(), &ExecutionStatus::Completed(0));
}

#[test]
fn dropped_receiver_does_not_block_the_child() {
    let fake = FakeCompiler::with_script("i=0\nwhile [ $i -lt 2000 ]; do echo line $i; i=$((i+1)); done");
    let (mut sender, receiver) = mpsc::channel::<Vec<u8>>();
    drop(receiver);
    let outcome = fake
        .sandbox()
        .run(&fake.project_dir, GENEROUS, &mut sender)
        .expect("run");
    assert_eq!(outcome.status(), &ExecutionStatus::Completed(0));
    assert!(outcome.bytes() > 0);
}
