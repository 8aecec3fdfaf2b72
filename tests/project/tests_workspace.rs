//! Workspace loading and on-disk write-back.

use std::fs;
use std::path::Path;

use ravel::mapping::parse_tiny_v2;
use ravel::project::{WorkspaceLoader, collect_java_files};
use ravel::remap::{FsDocumentStore, Remapper};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::helpers::remap_helpers::*;

const MAPPINGS: &str = "tiny\t2\t0\tofficial\tnamed
c\tlib/a\tlib/Engine
\tm\t()V\tb\tstart
";

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_collect_java_files_sorted() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "b/Two.java", "class Two {}");
    write(dir.path(), "a/One.java", "class One {}");
    write(dir.path(), "a/notes.txt", "skip");

    let files = collect_java_files(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, ["a/One.java", "b/Two.java"]);
}

#[test]
fn test_remap_workspace_on_disk() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    let libs = dir.path().join("libs");
    write(
        &src,
        "app/Car.java",
        "package app;\n\nimport lib.a;\n\nclass Car {\n    void drive(a engine) {\n        engine.b();\n    }\n}\n",
    );
    write(&libs, "lib/a.java", "package lib;\n\npublic class a {\n    public void b() {\n    }\n}\n");

    let table = parse_tiny_v2(MAPPINGS).unwrap();
    let program = WorkspaceLoader::new()
        .with_source_root(&src)
        .with_library_root(&libs)
        .with_mapping(&table)
        .load()
        .unwrap();
    assert_eq!(program.files().len(), 2);
    assert_eq!(program.source_files().count(), 1);

    let report = Remapper::new(quiet_config()).run(
        &program,
        &single_chain(table),
        &FsDocumentStore,
        &CancellationToken::new(),
    );

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.files_changed, 1);
    assert_eq!(
        fs::read_to_string(src.join("app/Car.java")).unwrap(),
        "package app;\n\nimport lib.Engine;\n\nclass Car {\n    void drive(Engine engine) {\n        engine.start();\n    }\n}\n"
    );
    // Library files are read, never written
    assert_eq!(
        fs::read_to_string(libs.join("lib/a.java")).unwrap(),
        "package lib;\n\npublic class a {\n    public void b() {\n    }\n}\n"
    );
    // No temp files left behind
    let temps = WalkDir::new(dir.path())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(temps, 0);
}
