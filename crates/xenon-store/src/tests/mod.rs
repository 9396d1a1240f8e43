//! Crate-level store tests.

use tempfile::TempDir;

use crate::{LoadOutcome, ProjectStore, StoreError};

mod behaviour;

fn store_in(root: &TempDir) -> ProjectStore {
    ProjectStore::new(root.path().join("projects"), "xc", "main.xc").expect("store")
}

#[test]
fn rejects_invalid_entry_file() {
    let root = TempDir::new().expect("temp dir");
    let error = ProjectStore::new(root.path(), "xc", "main.txt").expect_err("must reject");
    assert!(matches!(error, StoreError::EntryFile { .. }));
}

#[test]
fn save_creates_project_lazily() {
    let root = TempDir::new().expect("temp dir");
    let store = store_in(&root);
    let project = store.project_id("alpha").expect("project");
    let file = store.file_name("main.xc").expect("file");

    assert!(!store.exists(&project));
    store.save(&project, &file, b"init\n").expect("save");
    assert!(store.exists(&project));
    store.save(&project, &file, b"init\n\n").expect("second save");
    assert_eq!(
        store.load(&project, &file).expect("load"),
        LoadOutcome::Found(b"init\n\n".to_vec())
    );
}

#[test]
fn existing_project_without_entry_file_is_not_bootstrapped() {
    let root = TempDir::new().expect("temp dir");
    let store = store_in(&root);
    let project = store.project_id("alpha").expect("project");
    let helper = store.file_name("helper.xc").expect("file");
    let entry = store.file_name("main.xc").expect("file");

    store.save(&project, &helper, b"; helper\n").expect("save");
    assert_eq!(
        store.load(&project, &entry).expect("load"),
        LoadOutcome::NotFound
    );
}

#[test]
fn bootstrap_override_replaces_example() {
    let root = TempDir::new().expect("temp dir");
    let store = store_in(&root).with_bootstrap(b"; custom\n".to_vec());
    let project = store.project_id("fresh").expect("project");
    let entry = store.file_name("main.xc").expect("file");
    assert_eq!(
        store.load(&project, &entry).expect("load").into_body(),
        b"; custom\n"
    );
}

#[test]
fn empty_content_is_saved_verbatim() {
    let root = TempDir::new().expect("temp dir");
    let store = store_in(&root);
    let project = store.project_id("alpha").expect("project");
    let file = store.file_name("main.xc").expect("file");
    store.save(&project, &file, b"").expect("save");
    assert_eq!(
        store.load(&project, &file).expect("load"),
        LoadOutcome::Found(Vec::new())
    );
}

#[test]
fn list_of_unknown_project_is_empty() {
    let root = TempDir::new().expect("temp dir");
    let store = store_in(&root);
    let project = store.project_id("ghost").expect("project");
    assert!(store.list(&project).expect("list").is_empty());
}

#[cfg(unix)]
#[test]
fn saved_tree_is_world_accessible() {
    use std::os::unix::fs::PermissionsExt;

    let root = TempDir::new().expect("temp dir");
    let store = store_in(&root);
    let project = store.project_id("alpha").expect("project");
    let file = store.file_name("main.xc").expect("file");
    store.save(&project, &file, b"init\n").expect("save");

    let directory = store.project_dir(&project);
    let dir_mode = std::fs::metadata(&directory).expect("dir").permissions().mode();
    let file_mode = std::fs::metadata(directory.join("main.xc"))
        .expect("file")
        .permissions()
        .mode();
    assert_eq!(dir_mode & 0o777, 0o777);
    assert_eq!(file_mode & 0o777, 0o666);
}
