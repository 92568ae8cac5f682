//! Materializer properties exercised against a small local template root.

use creator_core::templates::{
    materialize, Action, CollisionFlags, Renderer, Reporter, TemplateStore,
};
use creator_core::{CreatorError, VariableContext};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const MANIFEST: &str = "\
name: demo
description: Demo root
always_refresh:
  - \"ci/**\"
protect:
  - \"README.md\"
";

/// Bytes that look like a placeholder but live in a copy-only file
const OPAQUE: &[u8] = b"\x00\x01{{ namespace }}\xff\xfe";

fn template_store() -> (TempDir, TemplateStore) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("demo");
    fs::create_dir_all(root.join("ci")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("template.yaml"), MANIFEST).unwrap();
    fs::write(
        root.join("README.md.j2"),
        "# {{ namespace }}.{{ collection_name }}\n",
    )
    .unwrap();
    fs::write(root.join("ci/build.yml.j2"), "name: {{ collection_name }}\n").unwrap();
    fs::write(root.join("docs/logo.bin"), OPAQUE).unwrap();
    let store = TemplateStore::local(dir.path().to_path_buf());
    (dir, store)
}

fn context() -> VariableContext {
    let mut ctx = VariableContext::new();
    ctx.insert("namespace", "testns");
    ctx.insert("collection_name", "testname");
    ctx
}

fn run(
    store: &TemplateStore,
    dest: &Path,
    ctx: &VariableContext,
    flags: CollisionFlags,
) -> (creator_core::Result<()>, Reporter) {
    let root = store.load("demo").unwrap();
    let mut reporter = Reporter::new();
    let result = materialize(&root, dest, ctx, &flags, &Renderer::new(), &mut reporter);
    (result, reporter)
}

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn same_inputs_produce_identical_trees() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    let first = out.path().join("first");
    let second = out.path().join("second");

    run(&store, &first, &context(), CollisionFlags::default()).0.unwrap();
    run(&store, &second, &context(), CollisionFlags::default()).0.unwrap();

    let a = snapshot(&first);
    assert_eq!(a, snapshot(&second));
    assert_eq!(a.len(), 3);
}

#[test]
fn copy_entries_are_byte_identical() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    run(&store, out.path(), &context(), CollisionFlags::default()).0.unwrap();

    assert_eq!(fs::read(out.path().join("docs/logo.bin")).unwrap(), OPAQUE);
    assert_eq!(
        fs::read_to_string(out.path().join("README.md")).unwrap(),
        "# testns.testname\n"
    );
    assert!(!out.path().join("README.md.j2").exists());
}

#[test]
fn protected_file_rejects_without_flags() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("README.md"), "mine\n").unwrap();

    let (result, reporter) = run(&store, out.path(), &context(), CollisionFlags::default());
    match result {
        Err(CreatorError::DestinationConflict { path }) => {
            assert_eq!(path, out.path().join("README.md"))
        }
        other => panic!("expected a destination conflict, got {:?}", other),
    }
    assert!(reporter.records().iter().all(|r| r.action != Action::Overwritten));
    assert_eq!(fs::read_to_string(out.path().join("README.md")).unwrap(), "mine\n");
}

#[test]
fn protected_file_skipped_with_no_overwrite() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("README.md"), "mine\n").unwrap();

    let flags = CollisionFlags {
        no_overwrite: true,
        ..Default::default()
    };
    let (result, reporter) = run(&store, out.path(), &context(), flags);
    result.unwrap();

    assert_eq!(fs::read_to_string(out.path().join("README.md")).unwrap(), "mine\n");
    let summary = reporter.summary();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.created, 2);
}

#[test]
fn protected_file_replaced_with_overwrite() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("README.md"), "mine\n").unwrap();

    let flags = CollisionFlags {
        overwrite: true,
        ..Default::default()
    };
    let (result, reporter) = run(&store, out.path(), &context(), flags);
    result.unwrap();

    assert_eq!(
        fs::read_to_string(out.path().join("README.md")).unwrap(),
        "# testns.testname\n"
    );
    assert_eq!(reporter.summary().overwritten, 1);
}

#[test]
fn always_refresh_files_rewritten_without_flags() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    fs::create_dir_all(out.path().join("ci")).unwrap();
    fs::write(out.path().join("ci/build.yml"), "stale\n").unwrap();

    let (result, reporter) = run(&store, out.path(), &context(), CollisionFlags::default());
    result.unwrap();

    assert_eq!(
        fs::read_to_string(out.path().join("ci/build.yml")).unwrap(),
        "name: testname\n"
    );
    let refreshed: Vec<_> = reporter
        .records()
        .iter()
        .filter(|r| r.action == Action::Overwritten)
        .collect();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].path, out.path().join("ci/build.yml"));
}

#[test]
fn missing_variable_fails_before_writing_that_file() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    let mut ctx = VariableContext::new();
    ctx.insert("namespace", "testns");

    let (result, _) = run(&store, out.path(), &ctx, CollisionFlags::default());
    assert!(matches!(
        result,
        Err(CreatorError::UnresolvedPlaceholder { .. })
    ));
    assert!(!out.path().join("README.md").exists());
}

#[test]
fn file_in_place_of_directory_stops_the_walk() {
    let (_templates, store) = template_store();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("docs"), "not a directory\n").unwrap();

    let (result, reporter) = run(&store, out.path(), &context(), CollisionFlags::default());
    match result {
        Err(CreatorError::Materialization { path, .. }) => assert_eq!(path, out.path().join("docs")),
        other => panic!("expected a materialization error, got {:?}", other),
    }
    // Earlier entries stay written, later ones are never reached
    assert_eq!(
        fs::read_to_string(out.path().join("README.md")).unwrap(),
        "# testns.testname\n"
    );
    assert!(reporter
        .records()
        .iter()
        .any(|r| r.path == out.path().join("README.md") && r.action == Action::Created));
    assert!(out.path().join("docs").is_file());
    assert!(!out.path().join("docs/logo.bin").exists());
}
