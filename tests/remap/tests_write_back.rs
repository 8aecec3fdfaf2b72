//! Transactional write-back through a full run.

use std::path::Path;

use ravel::mapping::NamespaceMapping;
use ravel::remap::{MemoryDocumentStore, Remapper};
use tokio_util::sync::CancellationToken;

use crate::helpers::remap_helpers::*;

const SOURCE: &str = "package a;

class Foo {
    int b;

    int c() {
        return b;
    }
}
";

fn table() -> NamespaceMapping {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("a/Foo", &["a/Widget"])
        .field("b", Some("I"), &["size"])
        .method("c", "()I", &["size"]);
    table
}

#[test]
fn test_cancelled_run_writes_nothing() {
    let program = program(&[("src/a/Foo.java", SOURCE)]);
    let store = MemoryDocumentStore::from_files(program.files());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = Remapper::new(quiet_config()).run(&program, &single_chain(table()), &store, &cancel);

    assert!(report.cancelled);
    assert_eq!(report.files_changed, 0);
    assert_eq!(store.get(Path::new("src/a/Foo.java")).as_deref(), Some(SOURCE));
}

#[test]
fn test_stale_document_is_not_overwritten() {
    let program = program(&[("src/a/Foo.java", SOURCE)]);
    let store = MemoryDocumentStore::from_files(program.files());
    let edited = format!("// edited elsewhere\n{SOURCE}");
    store.insert("src/a/Foo.java", edited.clone());

    let report = Remapper::new(quiet_config()).run(
        &program,
        &single_chain(table()),
        &store,
        &CancellationToken::new(),
    );

    assert!(!report.failures.is_empty());
    assert!(report.failures.iter().all(|d| d.issue.code() == "R0006"));
    assert_eq!(report.files_changed, 0);
    assert_eq!(store.get(Path::new("src/a/Foo.java")), Some(edited));
}

#[test]
fn test_missing_document_is_a_failure() {
    let program = program(&[("src/a/Foo.java", SOURCE)]);
    let store = MemoryDocumentStore::new();

    let report = Remapper::new(quiet_config()).run(
        &program,
        &single_chain(table()),
        &store,
        &CancellationToken::new(),
    );

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.files_changed, 0);
}

#[test]
fn test_each_file_is_written_once() {
    let program = program(&[("src/a/Foo.java", SOURCE)]);
    let run = run_remap(&program, &single_chain(table()), quiet_config());

    assert_eq!(run.report.files_changed, 1);
    assert_eq!(
        run.text("src/a/Foo.java"),
        "package a;

class Widget {
    int size;

    int size() {
        return size;
    }
}
"
    );
}

#[test]
fn test_parallel_analysis_matches_sequential() {
    let sources: Vec<(String, String)> = (0..8)
        .map(|i| {
            (
                format!("src/a/User{i}.java"),
                format!("package a;\n\nclass User{i} {{\n    int read(Foo foo) {{\n        return foo.c() + foo.b;\n    }}\n}}\n"),
            )
        })
        .chain([("src/a/Foo.java".to_string(), SOURCE.to_string())])
        .collect();
    let borrowed: Vec<(&str, &str)> = sources.iter().map(|(p, t)| (p.as_str(), t.as_str())).collect();
    let program = program(&borrowed);

    let sequential = run_remap(&program, &single_chain(table()), quiet_config().with_parallelism(1));
    let parallel = run_remap(&program, &single_chain(table()), quiet_config().with_parallelism(4));

    for (path, _) in &sources {
        assert_eq!(sequential.text(path), parallel.text(path));
    }
    assert_eq!(
        parallel.text("src/a/User3.java"),
        "package a;\n\nclass User3 {\n    int read(Widget foo) {\n        return foo.size() + foo.size;\n    }\n}\n"
    );
}
