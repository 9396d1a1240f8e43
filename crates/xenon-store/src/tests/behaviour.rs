//! Behaviour-driven tests for the project store.

use std::cell::RefCell;
use std::fs;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use crate::{EXAMPLE_PROGRAM, FileName, LoadOutcome, ProjectId, ProjectStore};

const PROGRAM: &str = "init\n\tprint(\"saved\")\n";

struct TestWorld {
    _root: TempDir,
    store: ProjectStore,
    outcome: Option<LoadOutcome>,
}

impl Default for TestWorld {
    fn default() -> Self {
        let root = TempDir::new().expect("temp dir");
        let store =
            ProjectStore::new(root.path().join("projects"), "xc", "main.xc").expect("store");
        Self {
            _root: root,
            store,
            outcome: None,
        }
    }
}

impl TestWorld {
    fn names(&self, project: &str, file: &str) -> (ProjectId, FileName) {
        (
            self.store.project_id(project).expect("project id"),
            self.store.file_name(file).expect("file name"),
        )
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("an empty project root")]
fn given_empty_root(world: &RefCell<TestWorld>) {
    world.borrow_mut().outcome = None;
}

#[when("a stray file {file} exists in project {project}")]
fn when_stray_file(world: &RefCell<TestWorld>, file: String, project: String) {
    let w = world.borrow();
    let id = w.store.project_id(&project).expect("project id");
    fs::write(w.store.project_dir(&id).join(file), b"stray").expect("write stray file");
}

#[when("file {file} of project {project} is saved with a program")]
fn when_saved(world: &RefCell<TestWorld>, file: String, project: String) {
    let w = world.borrow();
    let (id, name) = w.names(&project, &file);
    w.store
        .save(&id, &name, PROGRAM.as_bytes())
        .expect("save");
}

#[when("file {file} of project {project} is loaded")]
fn when_loaded(world: &RefCell<TestWorld>, file: String, project: String) {
    let mut w = world.borrow_mut();
    let (id, name) = w.names(&project, &file);
    let outcome = w.store.load(&id, &name).expect("load");
    w.outcome = Some(outcome);
}

#[then("loading {file} of project {project} returns the saved program")]
fn then_round_trip(world: &RefCell<TestWorld>, file: String, project: String) {
    let w = world.borrow();
    let (id, name) = w.names(&project, &file);
    assert_eq!(
        w.store.load(&id, &name).expect("load"),
        LoadOutcome::Found(PROGRAM.as_bytes().to_vec())
    );
}

#[then("the load outcome is the example program")]
fn then_example(world: &RefCell<TestWorld>) {
    assert_eq!(
        world.borrow().outcome,
        Some(LoadOutcome::Bootstrap(EXAMPLE_PROGRAM.as_bytes().to_vec()))
    );
}

#[then("the load outcome is empty")]
fn then_empty(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().outcome, Some(LoadOutcome::NotFound));
}

#[then("no project directory exists for {project}")]
fn then_no_directory(world: &RefCell<TestWorld>, project: String) {
    let w = world.borrow();
    let id = w.store.project_id(&project).expect("project id");
    assert!(!w.store.exists(&id), "loading must not create projects");
}

#[then("project {project} lists {first} and {second}")]
fn then_lists(world: &RefCell<TestWorld>, project: String, first: String, second: String) {
    let w = world.borrow();
    let id = w.store.project_id(&project).expect("project id");
    let names: Vec<String> = w
        .store
        .list(&id)
        .expect("list")
        .iter()
        .map(|name| name.as_str().to_owned())
        .collect();
    assert_eq!(names, vec![first, second]);
}

#[scenario(
    path = "tests/features/project_store.feature",
    name = "Saved content loads back unchanged"
)]
fn saved_content_round_trips(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/project_store.feature",
    name = "New visitors receive the example program"
)]
fn new_visitors_receive_example(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/project_store.feature",
    name = "Only the entry file is bootstrapped"
)]
fn only_entry_file_is_bootstrapped(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/project_store.feature",
    name = "Listing returns only source files in order"
)]
fn listing_is_filtered_and_sorted(world: RefCell<TestWorld>) {
    let _ = world;
}
